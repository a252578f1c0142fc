use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{f64_param, opt_str_param, str_param};
use crate::ipc::types::{AppState, Request};
use crate::layout::{self, DragSession};
use crate::model::ModelError;
use serde_json::json;

fn handle_desks_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = state.roster.as_ref().ok_or_else(HandlerErr::no_workspace)?;
    let name = opt_str_param(req, "className").unwrap_or(store.current_name());
    let period = store
        .period(name)
        .ok_or_else(|| ModelError::ClassNotFound(name.to_string()))?;
    Ok(json!({
        "className": name,
        "students": period.students,
        "teacherDesk": period.teacher_desk,
    }))
}

fn handle_desks_add(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let name = str_param(req, "name")?;
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let cfg = s.config;
    let desk = s
        .store
        .update_current(s.conn, |p| layout::add_student(p, cfg, name))?;
    tracing::debug!(desk = %desk.id, name = %desk.name, "student added");
    Ok(json!({ "desk": desk }))
}

fn handle_desks_bulk_import(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let text = str_param(req, "text")?;
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let cfg = s.config;
    let added = s
        .store
        .update_current(s.conn, |p| Ok(layout::bulk_import(p, cfg, text)))?;
    tracing::debug!(added = added.len(), "roster imported");
    Ok(json!({
        "added": added,
        "students": s.store.current().students,
    }))
}

fn handle_desks_move(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let desk_id = str_param(req, "deskId")?;
    let x = f64_param(req, "x")?;
    let y = f64_param(req, "y")?;
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let desk = s
        .store
        .update_current(s.conn, |p| layout::move_desk(p, desk_id, x, y))?;
    Ok(json!({ "desk": desk }))
}

fn handle_desks_rotate(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let desk_id = str_param(req, "deskId")?;
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let desk = s
        .store
        .update_current(s.conn, |p| layout::rotate_desk(p, desk_id))?;
    Ok(json!({ "desk": desk }))
}

fn handle_desks_delete(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let desk_id = str_param(req, "deskId")?;
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let removed = s
        .store
        .update_current(s.conn, |p| layout::remove_desk(p, desk_id))?;
    if s.drag.as_ref().map(|d| d.desk_id == removed.id).unwrap_or(false) {
        *s.drag = None;
    }
    tracing::debug!(desk = %removed.id, "desk removed");
    Ok(json!({ "deskId": removed.id }))
}

fn handle_drag_start(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let desk_id = str_param(req, "deskId")?;
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let session = DragSession::begin(s.store.current(), desk_id)?;
    let resp = json!({ "deskId": session.desk_id, "x": session.x, "y": session.y });
    *s.drag = Some(session);
    Ok(resp)
}

// Pointer-move frames only touch the transient position; nothing is saved.
fn handle_drag_move(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let dx = f64_param(req, "dx")?;
    let dy = f64_param(req, "dy")?;
    let drag = state
        .drag
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_drag", "no drag in progress"))?;
    drag.drag_by(dx, dy);
    Ok(json!({ "deskId": drag.desk_id, "x": drag.x, "y": drag.y }))
}

fn handle_drag_end(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let session = s
        .drag
        .take()
        .ok_or_else(|| HandlerErr::new("no_drag", "no drag in progress"))?;
    let desk = s.store.update_current(s.conn, |p| session.commit(p))?;
    Ok(json!({ "desk": desk }))
}

fn handle_drag_cancel(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let cancelled = state.drag.take().map(|d| d.desk_id);
    Ok(json!({ "cancelled": cancelled }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "desks.list" => handle_desks_list(state, req),
        "desks.add" => handle_desks_add(state, req),
        "desks.bulkImport" => handle_desks_bulk_import(state, req),
        "desks.move" => handle_desks_move(state, req),
        "desks.rotate" => handle_desks_rotate(state, req),
        "desks.delete" => handle_desks_delete(state, req),
        "desks.dragStart" => handle_drag_start(state, req),
        "desks.dragMove" => handle_drag_move(state, req),
        "desks.dragEnd" => handle_drag_end(state),
        "desks.dragCancel" => handle_drag_cancel(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
