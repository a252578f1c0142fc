use crate::export;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{opt_str_param, str_param};
use crate::ipc::types::{AppState, Request};
use crate::layout;
use serde_json::json;
use std::path::PathBuf;

fn handle_layout_export(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let workspace = state.workspace.clone().ok_or_else(HandlerErr::no_workspace)?;
    let store = state.roster.as_ref().ok_or_else(HandlerErr::no_workspace)?;
    let class_name = store.current_name();

    let out_path = match opt_str_param(req, "outPath") {
        Some(p) => PathBuf::from(p),
        None => workspace
            .join("exports")
            .join(export::export_file_name(class_name)),
    };

    let summary = export::export_layout_bundle(class_name, store.current(), &out_path)
        .map_err(|e| {
            tracing::error!(error = %e, "layout export failed");
            HandlerErr::new("export_failed", format!("{e:#}"))
        })?;

    Ok(json!({
        "className": class_name,
        "path": summary.path.to_string_lossy(),
        "bundleFormat": summary.bundle_format,
        "sha256": summary.sha256,
        "deskCount": summary.desk_count,
    }))
}

fn handle_layout_import(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let in_path = PathBuf::from(str_param(req, "path")?);
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;

    let imported = export::import_layout_bundle(&in_path).map_err(|e| {
        tracing::warn!(error = %e, path = %in_path.display(), "layout import failed");
        HandlerErr::new("import_failed", format!("{e:#}"))
    })?;

    let name = opt_str_param(req, "className")
        .map(str::to_string)
        .or(imported.class_name)
        .ok_or_else(|| HandlerErr::bad_params("missing className"))?;

    let mut period = imported.period;
    layout::reassign_ids(&mut period);
    if period.teacher_desk.is_none() {
        period.teacher_desk = Some(s.config.teacher_desk());
    }
    let student_count = period.students.len();

    let created = s.store.insert_class(s.conn, &name, period)?;
    *s.drag = None;
    s.selector.dismiss();
    tracing::info!(class = %created, students = student_count, "layout imported");

    Ok(json!({
        "className": created,
        "studentCount": student_count,
        "formatDetected": imported.format_detected,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "layout.export" => handle_layout_export(state, req),
        "layout.import" => handle_layout_import(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
