mod test_support;

use serde_json::json;
use std::collections::HashSet;
use test_support::{request_ok, spawn_sidecar_with_env, temp_dir};

#[test]
fn import_group_and_pick_in_a_fresh_period() {
    let workspace = temp_dir("seating-e2e");
    let (_child, mut stdin, mut reader) = spawn_sidecar_with_env(&[("SEATINGD_SEED", "17")]);

    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(selected["currentClass"], "PERIOD 1");

    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "desks.bulkImport",
        json!({ "text": "Ann\nBen\nCal\nDee" }),
    );
    let students = imported["students"].as_array().expect("students").clone();
    assert_eq!(students.len(), 4);

    let ids: HashSet<&str> = students
        .iter()
        .map(|d| d["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids.len(), 4);

    let names: Vec<&str> = students
        .iter()
        .map(|d| d["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["ANN", "BEN", "CAL", "DEE"]);

    // Default grid: five columns from (100, 200), 180 apart.
    let xs: Vec<f64> = students.iter().map(|d| d["x"].as_f64().expect("x")).collect();
    assert_eq!(xs, vec![100.0, 280.0, 460.0, 640.0]);
    assert!(students.iter().all(|d| d["y"].as_f64() == Some(200.0)));
    assert!(students.iter().all(|d| d["rotation"].as_u64() == Some(0)));

    let grouped = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "groups.generate",
        json!({ "groupSize": 2 }),
    );
    let groups = grouped["groups"].as_array().expect("groups");
    assert_eq!(groups.len(), 2);
    let mut members = Vec::new();
    for g in groups {
        let m = g["members"].as_array().expect("members");
        assert_eq!(m.len(), 2);
        for d in m {
            members.push(d["name"].as_str().expect("member name").to_string());
        }
    }
    members.sort();
    assert_eq!(members, vec!["ANN", "BEN", "CAL", "DEE"]);

    let picked = request_ok(&mut stdin, &mut reader, "4", "picker.pick", json!({}));
    let pick = picked["pick"]["name"].as_str().expect("pick name");
    assert!(["ANN", "BEN", "CAL", "DEE"].contains(&pick));
    let candidates = picked["candidates"].as_array().expect("candidates");
    assert_eq!(candidates.len(), 24);
    assert_eq!(candidates.last(), Some(&picked["pick"]));
    assert_eq!(picked["intervalMs"], 80);

    let st = request_ok(&mut stdin, &mut reader, "5", "picker.state", json!({}));
    assert_eq!(st["state"], "settled");
    assert_eq!(st["pick"], picked["pick"]);

    let dismissed = request_ok(&mut stdin, &mut reader, "6", "picker.dismiss", json!({}));
    assert_eq!(dismissed["state"], "idle");

    let _ = std::fs::remove_dir_all(workspace);
}
