//! Table of one path's recorded sizes with per-row deltas and a trend line.

use serde::Serialize;

use crate::report::table::format_delta;
use crate::store::trend::{self, Trend, TrendType};
use crate::store::SizePoint;
use crate::util::{format_bytes, format_timestamp};

#[derive(Debug, Serialize)]
pub struct HistoryReport {
    pub path: String,
    pub points: Vec<SizePoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

impl HistoryReport {
    pub fn new(path: String, points: Vec<SizePoint>) -> Self {
        let trend = trend::summarize(&points);
        HistoryReport { path, points, trend }
    }
}

pub fn render(report: &HistoryReport) -> String {
    if report.points.is_empty() {
        return format!("No snapshots recorded for {}.\n", report.path);
    }

    let mut output = format!("History of {}\n", report.path);
    output.push_str(&format!("{:<18} {:>10} {:>11}\n", "Recorded", "Size", "Change"));
    output.push_str(&"-".repeat(41));
    output.push('\n');

    for (point, delta) in report.points.iter().zip(trend::deltas(&report.points)) {
        output.push_str(&format!(
            "{:<18} {:>10} {:>11}\n",
            format_timestamp(point.timestamp),
            format_bytes(point.size),
            delta.map(format_delta).unwrap_or_default()
        ));
    }

    if let Some(trend) = &report.trend {
        let verb = match trend.trend_type {
            TrendType::Grew => "grew",
            TrendType::Shrank => "shrank",
            TrendType::Unchanged => "unchanged",
        };
        output.push_str(&format!(
            "\n{verb}: {} -> {} ({}) over {} snapshots\n",
            format_bytes(trend.first.size),
            format_bytes(trend.last.size),
            format_delta(trend.net_change),
            report.points.len()
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_message() {
        let report = HistoryReport::new("/data".into(), vec![]);
        assert_eq!(render(&report), "No snapshots recorded for /data.\n");
    }

    #[test]
    fn rows_and_summary() {
        let report = HistoryReport::new(
            "/data/a".into(),
            vec![
                SizePoint { timestamp: 100, size: 1024 },
                SizePoint { timestamp: 200, size: 2048 },
            ],
        );
        let out = render(&report);
        assert!(out.contains("History of /data/a"));
        assert!(out.contains("+1.0K"));
        assert!(out.contains("grew: 1.0K -> 2.0K (+1.0K) over 2 snapshots"));
    }
}
