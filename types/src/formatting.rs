//! Centralized number formatting and rate helpers.
//!
//! Every percentage and per-second figure that leaves the engine goes
//! through this module so snapshots and log lines agree on rounding.

/// Round to two decimal places, half away from zero.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::round2;
/// assert_eq!(round2(33.333_33), 33.33);
/// assert_eq!(round2(66.666_67), 66.67);
/// ```
#[inline]
pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// `count / hits * 100`, capped at 100 and rounded. Zero when there are no hits.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::capped_rate;
/// assert_eq!(capped_rate(1, 3), 33.33);
/// assert_eq!(capped_rate(5, 0), 0.0);
/// assert_eq!(capped_rate(9, 3), 100.0);
/// ```
pub fn capped_rate(count: u32, hits: u32) -> f64 {
    if hits == 0 {
        return 0.0;
    }
    let rate = count as f64 / hits as f64 * 100.0;
    round2(rate.min(100.0))
}

/// Additional-hit rate: extra hits relative to the hits that were not extra.
///
/// Defined only while `hits > add_hits`; otherwise zero.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::add_hit_rate;
/// assert_eq!(add_hit_rate(1, 3), 50.0);
/// assert_eq!(add_hit_rate(3, 3), 0.0);
/// ```
pub fn add_hit_rate(add_hits: u32, hits: u32) -> f64 {
    if hits <= add_hits {
        return 0.0;
    }
    let rate = add_hits as f64 / (hits - add_hits) as f64 * 100.0;
    round2(rate.min(100.0))
}

/// `part / whole * 100` rounded, zero when `whole` is not positive.
pub fn share_percent(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

/// Damage per second over a whole-second duration, rounded.
pub fn per_second(total: i64, duration_secs: i64) -> f64 {
    if duration_secs <= 0 {
        return 0.0;
    }
    round2(total as f64 / duration_secs as f64)
}

/// Format a large number with K/M suffix for compact display.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::format_compact;
/// assert_eq!(format_compact(500), "500");
/// assert_eq!(format_compact(1_500), "1.50K");
/// assert_eq!(format_compact(1_500_000), "1.50M");
/// ```
pub fn format_compact(n: i64) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}

/// Format milliseconds as `m:ss`.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::format_duration_ms;
/// assert_eq!(format_duration_ms(65_000), "1:05");
/// assert_eq!(format_duration_ms(0), "0:00");
/// ```
pub fn format_duration_ms(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
