//! Number and size formatting for summaries.

/// Formats a number with comma separators for thousands.
///
/// # Examples
///
/// ```
/// use gcp_log_tools::utils::format::format_number;
///
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(555), "555");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Formats a byte count as `N bytes (approx. X.XX MB)`.
///
/// ```
/// use gcp_log_tools::utils::format::format_bytes;
///
/// assert_eq!(format_bytes(3_145_728), "3,145,728 bytes (approx. 3.00 MB)");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    format!(
        "{} bytes (approx. {:.2} MB)",
        format_number(bytes as usize),
        mb
    )
}

/// Share of `part` in `total` as a percentage, 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(12), "12");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(123_456), "123,456");
        assert_eq!(format_number(1_234_567), "1,234,567");
        assert_eq!(format_number(1_000_000_000), "1,000,000,000");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 bytes (approx. 0.00 MB)");
        assert_eq!(format_bytes(1_572_864), "1,572,864 bytes (approx. 1.50 MB)");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }
}
