//! Wall-clock stamps used by progress output and sink lines.
use chrono::{DateTime, Local};

/// Render a local timestamp as `YYYY-MM-DD HH:MM:SS.mmm ` (note the trailing space).
pub fn format_timestamp(at: DateTime<Local>) -> String {
    format!("{} ", at.format("%Y-%m-%d %H:%M:%S%.3f"))
}

/// Current local time in sink format.
pub fn timestamp() -> String {
    format_timestamp(Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pads_milliseconds_and_keeps_trailing_space() {
        let at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(7);
        assert_eq!(format_timestamp(at), "2024-01-02 03:04:05.007 ");
    }

    #[test]
    fn current_stamp_has_fixed_width() {
        assert_eq!(timestamp().len(), 24);
    }
}
