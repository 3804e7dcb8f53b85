//! Property tests: the on-disk line format.

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone};
    use linelog::entry::format_line;
    use proptest::prelude::*;

    proptest! {
        /// Every line is `<RFC 3339 second-precision stamp> - <message>\n` and
        /// the stamp reads back as the same instant.
        #[test]
        fn test_line_shape(
            secs in 0i64..4_102_444_800,
            offset_min in -720i32..=840,
            message in "[^\n]{0,80}",
        ) {
            let offset = FixedOffset::east_opt(offset_min * 60).unwrap();
            let now = offset.timestamp_opt(secs, 0).unwrap();

            let mut line = String::new();
            format_line(&mut line, &now, &message);

            prop_assert!(line.ends_with('\n'));
            let (stamp, rest) = line.split_once(" - ").unwrap();
            prop_assert_eq!(rest, format!("{message}\n"));
            prop_assert!(!stamp.contains('.'), "second precision only");

            let parsed = DateTime::parse_from_rfc3339(stamp).unwrap();
            prop_assert_eq!(parsed.timestamp(), secs);
            prop_assert_eq!(parsed.offset().local_minus_utc(), offset_min * 60);
        }
    }
}
