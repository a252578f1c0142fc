use crate::config;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::roster::RosterStore;
use serde_json::json;
use std::path::{Path, PathBuf};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "currentClass": state.roster.as_ref().map(|r| r.current_name().to_string()),
        }),
    )
}

/// Opens the workspace database and restores config and roster from it.
/// Any in-flight pick or drag belongs to the previous workspace and is dropped.
pub fn select_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<()> {
    let conn = db::open_db(path)?;
    let cfg = config::load_config(&conn);
    let roster = RosterStore::load(&conn, &cfg);

    tracing::info!(
        workspace = %path.display(),
        classes = roster.snapshot().periods.len(),
        current = %roster.current_name(),
        "workspace selected"
    );

    state.workspace = Some(path.to_path_buf());
    state.config = cfg;
    state.roster = Some(roster);
    state.db = Some(conn);
    state.selector.dismiss();
    state.drag = None;
    Ok(())
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match select_workspace(state, &path) {
        Ok(()) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "currentClass": state.roster.as_ref().map(|r| r.current_name().to_string()),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "workspace open failed");
            err(&req.id, "db_open_failed", format!("{e:?}"), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
