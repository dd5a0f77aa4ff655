use serde::Serialize;

const KIB: f64 = 1024.0;

/// Compact human-readable size: "512.0B", "1.5K", "3.2G".
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    for suffix in ["B", "K", "M", "G", "T"] {
        if value < KIB {
            return format!("{value:.1}{suffix}");
        }
        value /= KIB;
    }
    format!("{value:.1}P")
}

/// Display unit for sizes in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Unit {
    /// picks the largest suffix that keeps the value under 1024
    Human,
    Bytes,
    KiB,
    MiB,
    GiB,
    TiB,
}

impl Unit {
    pub const FIXED: [Unit; 5] = [Unit::Bytes, Unit::KiB, Unit::MiB, Unit::GiB, Unit::TiB];

    pub fn divisor(self) -> Option<f64> {
        match self {
            Unit::Human => None,
            Unit::Bytes => Some(1.0),
            Unit::KiB => Some(KIB),
            Unit::MiB => Some(KIB * KIB),
            Unit::GiB => Some(KIB * KIB * KIB),
            Unit::TiB => Some(KIB * KIB * KIB * KIB),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Unit::Human => "auto",
            Unit::Bytes => "B",
            Unit::KiB => "KiB",
            Unit::MiB => "MiB",
            Unit::GiB => "GiB",
            Unit::TiB => "TiB",
        }
    }

    pub fn format(self, bytes: u64) -> String {
        match self.divisor() {
            None => format_bytes(bytes),
            Some(_) if self == Unit::Bytes => format!("{bytes} B"),
            Some(div) => format!("{:.2} {}", bytes as f64 / div, self.label()),
        }
    }

    /// Whether `bytes` shows as at least 0.01 in this unit.
    pub fn is_readable_for(self, bytes: u64) -> bool {
        match self.divisor() {
            None => true,
            Some(div) => bytes as f64 / div >= 0.01,
        }
    }
}

/// Units worth offering for a size: Human always, then every fixed unit that
/// would not render as "0.00".
pub fn valid_units(bytes: u64) -> Vec<Unit> {
    std::iter::once(Unit::Human)
        .chain(Unit::FIXED.into_iter().filter(|u| u.is_readable_for(bytes)))
        .collect()
}

/// Timestamp as local time, "2024-03-01 14:05".
pub fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let keep = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(keep).collect();
        format!("{truncated}...")
    }
}
