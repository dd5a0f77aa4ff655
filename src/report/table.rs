//! Plain-text table of the directories a recorder run wrote.
//!
//! One line per changed path, sorted by path so parents precede children,
//! with the previous size, new size and signed delta.

use crate::recorder::RecordResult;
use crate::util::{format_bytes, truncate};

const PATH_WIDTH: usize = 50;

pub fn render(result: &RecordResult) -> String {
    if result.changes.is_empty() {
        return String::from("No size changes.\n");
    }

    let mut output = String::new();

    let mut changes: Vec<_> = result.changes.iter().collect();
    changes.sort_by(|a, b| a.path.cmp(&b.path));

    output.push_str(&format!(
        "{:<width$} {:>10} {:>10} {:>11}\n",
        "Path", "Before", "After", "Change",
        width = PATH_WIDTH
    ));
    output.push_str(&"-".repeat(PATH_WIDTH + 34));
    output.push('\n');

    for change in changes {
        let before = change
            .previous
            .map(format_bytes)
            .unwrap_or_else(|| "new".to_string());

        output.push_str(&format!(
            "{:<width$} {:>10} {:>10} {:>11}\n",
            truncate(&change.path, PATH_WIDTH),
            before,
            format_bytes(change.size),
            format_delta(change.delta()),
            width = PATH_WIDTH
        ));
    }

    output.push_str(&format!("\n{} changed\n", result.changes.len()));
    output
}

pub fn format_delta(delta: i64) -> String {
    if delta >= 0 {
        format!("+{}", format_bytes(delta.unsigned_abs()))
    } else {
        format!("-{}", format_bytes(delta.unsigned_abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::Change;

    fn result(changes: Vec<Change>) -> RecordResult {
        RecordResult {
            timestamp: 0,
            changes,
            unchanged: 0,
            directories: 0,
            unreadable: 0,
            diagnostics: vec![],
            duration_ms: None,
            peak_memory_bytes: None,
        }
    }

    #[test]
    fn no_changes_says_so() {
        assert_eq!(render(&result(vec![])), "No size changes.\n");
    }

    #[test]
    fn parents_listed_before_children() {
        let out = render(&result(vec![
            Change { path: "/data/a".into(), previous: Some(1024), size: 2048 },
            Change { path: "/data".into(), previous: Some(1024), size: 2048 },
        ]));
        let data = out.find("/data ").unwrap();
        let child = out.find("/data/a").unwrap();
        assert!(data < child);
        assert!(out.contains("+1.0K"));
        assert!(out.contains("2 changed"));
    }

    #[test]
    fn first_observation_marked_new() {
        let out = render(&result(vec![Change { path: "/x".into(), previous: None, size: 10 }]));
        assert!(out.contains("new"));
    }

    #[test]
    fn negative_delta_has_minus_sign() {
        assert_eq!(format_delta(-2048), "-2.0K");
        assert_eq!(format_delta(0), "+0.0B");
    }
}
