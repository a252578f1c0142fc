use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::str_param;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_classes_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let Some(store) = state.roster.as_ref() else {
        return Ok(json!({ "classes": [], "current": null }));
    };

    // Counts let the UI label the period picker without a second request.
    let classes: Vec<serde_json::Value> = store
        .snapshot()
        .periods
        .iter()
        .map(|(name, period)| {
            json!({
                "name": name,
                "studentCount": period.students.len(),
                "hasTeacherDesk": period.teacher_desk.is_some(),
            })
        })
        .collect();

    Ok(json!({ "classes": classes, "current": store.current_name() }))
}

fn handle_classes_create(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let name = str_param(req, "name")?;
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let created = s.store.create_class(s.conn, s.config, name)?;
    *s.drag = None;
    s.selector.dismiss();
    Ok(json!({ "name": created, "current": s.store.current_name() }))
}

fn handle_classes_delete(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let name = str_param(req, "name")?;
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let before = s.store.current_name().to_string();
    let (deleted, current) = s.store.delete_class(s.conn, name)?;
    if current != before {
        *s.drag = None;
        s.selector.dismiss();
    }
    Ok(json!({ "deleted": deleted, "current": current }))
}

fn handle_classes_select(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let name = str_param(req, "name")?;
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    s.store.set_current(s.conn, name)?;
    // A drag or pick started in another period must not land here.
    *s.drag = None;
    s.selector.dismiss();
    Ok(json!({ "current": s.store.current_name() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classes.list" => handle_classes_list(state),
        "classes.create" => handle_classes_create(state, req),
        "classes.delete" => handle_classes_delete(state, req),
        "classes.select" => handle_classes_select(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
