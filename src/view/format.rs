use chrono::{DateTime, Utc};

/// Sizes reported by the detection API are megabytes.
pub fn file_size_mb(mb: f64) -> String {
    if mb < 1.0 {
        format!("{:.0} KB", mb * 1024.0)
    } else {
        format!("{:.2} MB", mb)
    }
}

/// Raw byte counts, for files that have not left the user's machine yet.
pub fn file_size_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}

pub fn long_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y, %I:%M %p").to_string()
}

pub fn short_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

pub fn long_date(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn megabyte_sizes() {
        assert_eq!(file_size_mb(0.5), "512 KB");
        assert_eq!(file_size_mb(2.0), "2.00 MB");
        assert_eq!(file_size_mb(0.0), "0 KB");
    }

    #[test]
    fn byte_sizes() {
        assert_eq!(file_size_bytes(512), "512 B");
        assert_eq!(file_size_bytes(1536), "1.5 KB");
        assert_eq!(file_size_bytes(2 * 1024 * 1024), "2.00 MB");
    }

    #[test]
    fn timestamps() {
        let at = Utc.with_ymd_and_hms(2024, 1, 5, 14, 30, 0).unwrap();
        assert_eq!(long_timestamp(&at), "January 5, 2024, 02:30 PM");
        assert_eq!(short_timestamp(&at), "Jan 5, 2024, 02:30 PM");
        assert_eq!(long_date(&at), "January 5, 2024");
    }
}
