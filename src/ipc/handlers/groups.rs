use crate::groups;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::i64_param;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_groups_generate(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let group_size = i64_param(req, "groupSize")?;
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let cfg = s.config;
    let rng = s.rng;
    let generated = s
        .store
        .update_current(s.conn, |p| groups::partition(p, cfg, group_size, rng))?;
    // Positions changed underneath any gesture in progress.
    *s.drag = None;

    let period = s.store.current();
    let groups: Vec<serde_json::Value> = generated
        .iter()
        .map(|g| {
            let members: Vec<serde_json::Value> = g
                .desk_ids
                .iter()
                .filter_map(|id| period.desk(id))
                .map(|d| json!({ "id": d.id, "name": d.name }))
                .collect();
            json!({ "index": g.index, "color": g.color, "members": members })
        })
        .collect();

    Ok(json!({
        "groupSize": group_size,
        "groups": groups,
        "students": period.students,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "groups.generate" => handle_groups_generate(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
