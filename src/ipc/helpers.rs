use crate::ipc::error::HandlerErr;
use crate::ipc::types::Request;

pub fn str_param<'a>(req: &'a Request, key: &str) -> Result<&'a str, HandlerErr> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {key}")))
}

pub fn opt_str_param<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

/// Finite number parameter. Rejects NaN/inf so the floor never holds them.
pub fn f64_param(req: &Request, key: &str) -> Result<f64, HandlerErr> {
    let v = req
        .params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {key}")))?;
    if !v.is_finite() {
        return Err(HandlerErr::bad_params(format!("{key} must be finite")));
    }
    Ok(v)
}

pub fn i64_param(req: &Request, key: &str) -> Result<i64, HandlerErr> {
    let value = req
        .params
        .get(key)
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {key}")))?;
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    // Numeric inputs from the UI may arrive as strings.
    value
        .as_str()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| HandlerErr::bad_params(format!("{key} must be an integer")))
}
