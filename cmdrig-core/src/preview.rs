//! Preview response payload and the sequencing that keeps out-of-order
//! responses from clobbering the displayed state.

use serde::Deserialize;

/// `{"command": ...}` on success, `{"error": ...}` on an application-level
/// failure. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PreviewResponse {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PreviewResponse {
    /// The text to display: a non-empty command, else the error, else nothing.
    pub fn display_text(&self) -> String {
        self.command
            .as_deref()
            .filter(|command| !command.is_empty())
            .or(self.error.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

/// Hands out a monotonically increasing sequence number per request and only
/// accepts the response matching the latest issued one. A stale response is
/// discarded without touching the display.
#[derive(Debug, Default)]
pub struct PreviewTracker {
    next_seq: u64,
    in_flight: Option<u64>,
    display: String,
}

impl PreviewTracker {
    pub fn begin(&mut self) -> u64 {
        self.next_seq += 1;
        self.in_flight = Some(self.next_seq);
        self.next_seq
    }

    /// Applies `text` as the displayed preview if `seq` is the latest issued
    /// request. Returns whether the display was updated.
    pub fn resolve(&mut self, seq: u64, text: String) -> bool {
        if self.in_flight != Some(seq) {
            return false;
        }
        self.in_flight = None;
        self.display = text;
        true
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_wins_over_error() {
        let response = PreviewResponse {
            command: Some("nxc smb host".to_string()),
            error: Some("ignored".to_string()),
        };
        assert_eq!(response.display_text(), "nxc smb host");
    }

    #[test]
    fn empty_command_falls_through_to_error() {
        let response = PreviewResponse {
            command: Some(String::new()),
            error: Some("unknown".to_string()),
        };
        assert_eq!(response.display_text(), "unknown");
    }

    #[test]
    fn stale_response_is_rejected() {
        let mut tracker = PreviewTracker::default();
        let first = tracker.begin();
        let second = tracker.begin();

        assert!(tracker.resolve(second, "new".to_string()));
        assert!(!tracker.resolve(first, "old".to_string()));
        assert_eq!(tracker.display(), "new");
    }

    #[test]
    fn in_flight_clears_once_latest_resolves() {
        let mut tracker = PreviewTracker::default();
        let seq = tracker.begin();
        assert!(tracker.in_flight());
        assert!(tracker.resolve(seq, "done".to_string()));
        assert!(!tracker.in_flight());
        assert!(!tracker.resolve(seq, "again".to_string()));
        assert_eq!(tracker.display(), "done");
    }
}
