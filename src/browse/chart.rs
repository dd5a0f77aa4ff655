//! Bar layout for a size history.
//!
//! Pure transform from a series and a viewport to bar positions and heights.
//! Heights are relative to the largest size inside the visible window.

use crate::store::SizePoint;
use crate::util::{format_timestamp, Unit};

/// Columns reserved per bar: one for the bar, one gap.
const MIN_SLOT: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    /// index into the full series
    pub index: usize,
    pub x: u16,
    pub width: u16,
    pub height: u16,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartLayout {
    pub bars: Vec<Bar>,
    pub label: Option<String>,
}

/// Number of bars that fit in `width` columns, never less than one.
pub fn capacity(width: u16) -> usize {
    usize::from((width / MIN_SLOT).max(1))
}

pub fn layout(
    series: &[SizePoint],
    viewport: Viewport,
    offset: usize,
    selected_bar: usize,
    unit: Unit,
) -> ChartLayout {
    if series.is_empty() || viewport.width == 0 || viewport.height == 0 {
        return ChartLayout::default();
    }

    let start = offset.min(series.len() - 1);
    let end = (start + capacity(viewport.width)).min(series.len());
    let visible = &series[start..end];

    let max_size = visible.iter().map(|p| p.size).max().unwrap_or(0);
    if max_size == 0 {
        return ChartLayout::default();
    }

    // visible.len() <= capacity(width) keeps slot >= 1
    let count = u16::try_from(visible.len()).unwrap_or(u16::MAX);
    let slot = (viewport.width / count).max(1);
    let bar_width = if slot >= MIN_SLOT { slot - 1 } else { 1 };
    let selected = selected_bar.min(visible.len() - 1);

    let bars = visible
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let ratio = point.size as f64 / max_size as f64;
            let height = (ratio * f64::from(viewport.height)).round() as u16;
            Bar {
                index: start + i,
                x: u16::try_from(i).unwrap_or(u16::MAX).saturating_mul(slot),
                width: bar_width,
                height: height.min(viewport.height),
                selected: i == selected,
            }
        })
        .collect();

    let point = visible[selected];
    let label = format!("{}  {}", format_timestamp(point.timestamp), unit.format(point.size));

    ChartLayout {
        bars,
        label: Some(label),
    }
}
