use rosterlab_core::model::NO_KILL_SENTINEL;

/// Format a points value with thousands separators
pub fn format_points(pts: u32) -> String {
    let digits = pts.to_string();
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let formatted: String = result.chars().rev().collect();
    format!("{formatted} pts")
}

/// Format a cost-per-kill value. Sentinel and degenerate values print as `-`.
pub fn format_cpk(cpk: f64) -> String {
    if cpk.is_nan() || cpk <= 0.0 || cpk >= NO_KILL_SENTINEL {
        "-".to_string()
    } else {
        format!("{cpk:.2}")
    }
}

/// Format an expected-kills value
pub fn format_kills(kills: f64) -> String {
    if kills >= 10.0 {
        format!("{kills:.1}")
    } else {
        format!("{kills:.2}")
    }
}

/// Truncate to `width` characters, marking the cut with `~`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(0), "0 pts");
        assert_eq!(format_points(995), "995 pts");
        assert_eq!(format_points(2000), "2,000 pts");
    }

    #[test]
    fn test_format_cpk() {
        assert_eq!(format_cpk(1.4), "1.40");
        assert_eq!(format_cpk(999.0), "-");
        assert_eq!(format_cpk(0.0), "-");
        assert_eq!(format_cpk(f64::NAN), "-");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Bolter", 10), "Bolter");
        assert_eq!(truncate("Intercessor Squad", 8), "Interce~");
    }
}
