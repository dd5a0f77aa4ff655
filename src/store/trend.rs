//! Growth summary over a window of snapshots.
//!
//! Compares the first and last point of a history series:
//! - classifies the path as grew, shrank or unchanged
//! - reports the net byte delta and the largest single step

use serde::Serialize;

use super::SizePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendType {
    Grew,
    Shrank,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trend {
    pub trend_type: TrendType,
    pub first: SizePoint,
    pub last: SizePoint,
    pub net_change: i64,
    /// largest absolute change between two consecutive points
    pub largest_step: i64,
}

fn signed(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}

/// Signed change from each point to the next; the first point has no delta.
pub fn deltas(points: &[SizePoint]) -> Vec<Option<i64>> {
    let mut out = Vec::with_capacity(points.len());
    let mut previous: Option<u64> = None;
    for point in points {
        out.push(previous.map(|p| signed(point.size).saturating_sub(signed(p))));
        previous = Some(point.size);
    }
    out
}

/// Summarizes a series; None when it is empty.
pub fn summarize(points: &[SizePoint]) -> Option<Trend> {
    let first = *points.first()?;
    let last = *points.last()?;

    let net_change = signed(last.size).saturating_sub(signed(first.size));
    let trend_type = match net_change {
        d if d > 0 => TrendType::Grew,
        d if d < 0 => TrendType::Shrank,
        _ => TrendType::Unchanged,
    };

    let largest_step = deltas(points)
        .into_iter()
        .flatten()
        .max_by_key(|d| d.unsigned_abs())
        .unwrap_or(0);

    Some(Trend {
        trend_type,
        first,
        last,
        net_change,
        largest_step,
    })
}
