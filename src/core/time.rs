//! Timestamp and id helpers shared by traces and JSON reports.

use serde_json::Value as JsonValue;
use ulid::Ulid;

/// Unix-epoch seconds with `Z` suffix (e.g. `1771220592Z`).
pub fn now_epoch_z() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{}Z", secs)
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}

/// Envelope for `--json` reports: fixed header fields merged with `body`.
pub fn report_envelope(mode: &str, status: &str, body: JsonValue) -> JsonValue {
    let mut base = serde_json::json!({
        "tool": "hcmd",
        "version": env!("CARGO_PKG_VERSION"),
        "ts": now_epoch_z(),
        "event_id": new_event_id(),
        "mode": mode,
        "status": status
    });
    if let (Some(base_obj), Some(body_obj)) = (base.as_object_mut(), body.as_object()) {
        for (k, v) in body_obj {
            base_obj.insert(k.clone(), v.clone());
        }
    }
    base
}
