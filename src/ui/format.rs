//! Pure view-model shaping: everything here is behavior the panels depend
//! on, kept free of ratatui so it can be tested directly.

use chrono::{DateTime, Local};

/// Fill-level tier for a tank gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Ok,
    Warn,
    Critical,
}

/// Exact at both boundaries: 50% is Ok territory's edge (still Warn-free),
/// 25% is still Warn, 24% is Critical.
pub fn gauge_tier(level_pct: f64) -> Tier {
    if level_pct > 50.0 {
        Tier::Ok
    } else if level_pct >= 25.0 {
        Tier::Warn
    } else {
        Tier::Critical
    }
}

/// Two-decimal currency string; absent renders as a dash placeholder,
/// never as an empty string or zero.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("${:.2}", p),
        None => "$--".to_string(),
    }
}

/// Competitor delta as signed whole cents: `+0c`, `+5c`, `-5c`.
/// Absent renders as the empty string (the row simply omits it).
pub fn format_delta(delta: Option<f64>) -> String {
    match delta {
        Some(d) => {
            let sign = if d >= 0.0 { "+" } else { "" };
            format!("{}{}c", sign, (d * 100.0).round() as i64)
        }
        None => String::new(),
    }
}

/// `12,400 / 20,000 gal`
pub fn format_gallons(gallons: f64, capacity: f64) -> String {
    format!(
        "{} / {} gal",
        add_commas(&format!("{:.0}", gallons)),
        add_commas(&format!("{:.0}", capacity))
    )
}

/// Wire timestamps (RFC 3339) shown as local wall-clock time; anything
/// unparsable falls back to a dash.
pub fn format_wire_time(ts: &str) -> String {
    match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.with_timezone(&Local).format("%H:%M:%S").to_string(),
        Err(_) => "--".to_string(),
    }
}

fn add_commas(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 && c != '-' {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_exact() {
        assert_eq!(gauge_tier(100.0), Tier::Ok);
        assert_eq!(gauge_tier(51.0), Tier::Ok);
        assert_eq!(gauge_tier(50.0), Tier::Warn);
        assert_eq!(gauge_tier(25.0), Tier::Warn);
        assert_eq!(gauge_tier(24.0), Tier::Critical);
        assert_eq!(gauge_tier(0.0), Tier::Critical);
    }

    #[test]
    fn price_placeholder_is_a_dash_not_zero() {
        assert_eq!(format_price(Some(2.899)), "$2.90");
        assert_eq!(format_price(Some(3.0)), "$3.00");
        assert_eq!(format_price(None), "$--");
    }

    #[test]
    fn delta_is_signed_whole_cents() {
        assert_eq!(format_delta(None), "");
        assert_eq!(format_delta(Some(0.0)), "+0c");
        assert_eq!(format_delta(Some(0.05)), "+5c");
        assert_eq!(format_delta(Some(-0.05)), "-5c");
        assert_eq!(format_delta(Some(0.123)), "+12c");
    }

    #[test]
    fn gallons_get_separators() {
        assert_eq!(format_gallons(12400.0, 20000.0), "12,400 / 20,000 gal");
        assert_eq!(format_gallons(900.0, 1000.0), "900 / 1,000 gal");
    }

    #[test]
    fn bad_wire_time_falls_back() {
        assert_eq!(format_wire_time("not-a-time"), "--");
        // A valid timestamp renders as HH:MM:SS in some local zone.
        let s = format_wire_time("2024-05-01T12:00:00Z");
        assert_eq!(s.len(), 8);
        assert_eq!(&s[2..3], ":");
    }
}
