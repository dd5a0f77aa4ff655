//! JSON output for record and history results.

use serde::Serialize;

pub fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{Change, RecordResult};

    #[test]
    fn record_result_serializes_changes() {
        let result = RecordResult {
            timestamp: 200,
            changes: vec![Change { path: "/data/a".into(), previous: Some(1024), size: 2048 }],
            unchanged: 3,
            directories: 4,
            unreadable: 0,
            diagnostics: vec![],
            duration_ms: None,
            peak_memory_bytes: None,
        };

        let value: serde_json::Value = serde_json::from_str(&render(&result)).unwrap();
        assert_eq!(value["timestamp"], 200);
        assert_eq!(value["changes"][0]["path"], "/data/a");
        assert_eq!(value["changes"][0]["previous"], 1024);
        assert!(value.get("duration_ms").is_none());
    }
}
