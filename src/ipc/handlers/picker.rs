use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::selector::SelectorState;
use serde_json::json;

fn state_json(state: &SelectorState) -> serde_json::Value {
    match state {
        SelectorState::Idle => json!({ "state": "idle" }),
        SelectorState::Cycling { remaining, shown } => json!({
            "state": "cycling",
            "remaining": remaining,
            "shown": shown,
        }),
        SelectorState::Settled(pick) => json!({ "state": "settled", "pick": pick }),
    }
}

fn handle_picker_pick(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let s = state.session().ok_or_else(HandlerErr::no_workspace)?;
    let shown = s.selector.pick(
        &s.store.current().students,
        s.config.selector_ticks,
        s.rng,
    )?;
    let pick = shown.last().cloned();
    tracing::debug!(
        ticks = shown.len(),
        pick = ?pick.as_ref().map(|p| p.name.as_str()),
        "student picked"
    );
    Ok(json!({
        "className": s.store.current_name(),
        "intervalMs": s.config.selector_interval_ms,
        "candidates": shown,
        "pick": pick,
    }))
}

fn handle_picker_state(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(state_json(state.selector.state()))
}

fn handle_picker_dismiss(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    state.selector.dismiss();
    Ok(state_json(state.selector.state()))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "picker.pick" => handle_picker_pick(state),
        "picker.state" => handle_picker_state(state),
        "picker.dismiss" => handle_picker_dismiss(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
