//! Small UI helpers: human-readable sizes, rates and percentages.

const K: f64 = 1024.0;

/// Bytes in B/KB/MB/GB, two decimals above bytes.
pub fn format_bytes(b: u64) -> String {
    let v = b as f64;
    if v < K {
        format!("{b} B")
    } else if v < K * K {
        format!("{:.2} KB", v / K)
    } else if v < K * K * K {
        format!("{:.2} MB", v / (K * K))
    } else {
        format!("{:.2} GB", v / (K * K * K))
    }
}

/// Signed byte count, e.g. a counter delta.
pub fn format_bytes_signed(b: i64) -> String {
    if b < 0 {
        format!("-{}", format_bytes(b.unsigned_abs()))
    } else {
        format_bytes(b as u64)
    }
}

/// Bytes per second in B/s..GB/s. Negative rates (counter reset) keep their sign.
pub fn format_network_rate(bps: f64) -> String {
    let sign = if bps < 0.0 { "-" } else { "" };
    let v = bps.abs();
    if v < K {
        format!("{sign}{v:.2} B/s")
    } else if v < K * K {
        format!("{sign}{:.2} KB/s", v / K)
    } else if v < K * K * K {
        format!("{sign}{:.2} MB/s", v / (K * K))
    } else {
        format!("{sign}{:.2} GB/s", v / (K * K * K))
    }
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

pub fn format_mb(b: u64) -> String {
    format!("{:.2} MB", b as f64 / K / K)
}

pub fn format_gb(b: u64) -> String {
    format!("{:.2} GB", b as f64 / K / K / K)
}

/// Gauge percent, clamped to what ratatui accepts.
pub fn gauge_percent(pct: f64) -> u16 {
    if pct.is_finite() {
        pct.clamp(0.0, 100.0).round() as u16
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
        assert_eq!(format_bytes_signed(-2048), "-2.00 KB");
    }

    #[test]
    fn rate_units() {
        assert_eq!(format_network_rate(300.0), "300.00 B/s");
        assert_eq!(format_network_rate(2048.0), "2.00 KB/s");
        assert_eq!(format_network_rate(-333.333), "-333.33 B/s");
    }

    #[test]
    fn percent_and_fixed_units() {
        assert_eq!(format_percentage(50.0, 2), "50.00%");
        assert_eq!(format_percentage(12.345, 1), "12.3%");
        assert_eq!(format_mb(1024 * 1024), "1.00 MB");
        assert_eq!(format_gb(1024 * 1024 * 1024 / 2), "0.50 GB");
        assert_eq!(gauge_percent(140.0), 100);
        assert_eq!(gauge_percent(f64::NAN), 0);
    }
}
