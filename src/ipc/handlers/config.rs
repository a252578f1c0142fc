use crate::config;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_config_get(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "config": state.config }))
}

fn handle_config_update(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let conn = state.db.as_ref().ok_or_else(HandlerErr::no_workspace)?;
    let patch = req
        .params
        .get("patch")
        .ok_or_else(|| HandlerErr::bad_params("missing patch"))?;

    let next = state
        .config
        .merged(patch)
        .map_err(|m| HandlerErr::bad_params(m).with_details(json!({ "patch": patch })))?;
    config::save_config(conn, &next)
        .map_err(|e| HandlerErr::new("db_write_failed", format!("{e:#}")))?;

    tracing::info!("config updated");
    state.config = next;
    Ok(json!({ "config": state.config }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "config.get" => handle_config_get(state),
        "config.update" => handle_config_update(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
