//! Text formatting for sizes and CSV cells.

const KIB: f64 = 1024.0;

/// Binary-unit file size with at most two decimals: `1.5 KB`, `10 MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let b = bytes as f64;
    let (value, unit) = if b >= KIB * KIB * KIB {
        (b / (KIB * KIB * KIB), "GB")
    } else if b >= KIB * KIB {
        (b / (KIB * KIB), "MB")
    } else if b >= KIB {
        (b / KIB, "KB")
    } else {
        return format!("{} Bytes", bytes);
    };

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, unit)
}

/// Quote a CSV cell when it contains a separator, quote or line break.
pub fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_size(1_234_567), "1.18 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("Acme Co"), "Acme Co");
        assert_eq!(escape_csv("Acme, Inc."), "\"Acme, Inc.\"");
        assert_eq!(escape_csv("the \"Lessor\""), "\"the \"\"Lessor\"\"\"");
        assert_eq!(escape_csv("line1\nline2"), "\"line1\nline2\"");
    }
}
