//! Blocking preview client. Called from a background thread by the GUI and
//! directly by the one-shot CLI preview command.

use cmdrig_core::{FormSnapshot, PreviewResponse};
use std::time::Duration;

const PREVIEW_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs a snapshot to the preview endpoint. Non-2xx responses still carry an
/// application error payload and are parsed; only transport-level failures
/// come back as `Err`, with the failure's message text.
pub fn fetch_preview(url: &str, snapshot: &FormSnapshot) -> Result<PreviewResponse, String> {
    let body = serde_json::to_string(snapshot).map_err(|err| err.to_string())?;
    let response = match ureq::post(url)
        .timeout(PREVIEW_TIMEOUT)
        .set("Content-Type", "application/json")
        .send_string(&body)
    {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(err) => return Err(err.to_string()),
    };
    let text = response.into_string().map_err(|err| err.to_string())?;
    serde_json::from_str(&text).map_err(|err| format!("Failed to parse preview response: {err}"))
}
