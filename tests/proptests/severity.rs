//! Property tests: severity names and threshold filtering.

#[cfg(test)]
mod tests {
    use linelog::{Severity, SeverityFilter};
    use proptest::prelude::*;

    fn severity() -> impl Strategy<Value = Severity> {
        prop::sample::select(Severity::ALL.to_vec())
    }

    proptest! {
        /// Any mix of upper and lower case parses to the same level
        #[test]
        fn test_parse_ignores_case(level in severity(), mask in any::<u64>()) {
            let name: String = level
                .as_str()
                .chars()
                .enumerate()
                .map(|(i, c)| if mask >> (i % 64) & 1 == 1 { c.to_ascii_uppercase() } else { c })
                .collect();
            prop_assert_eq!(name.parse::<Severity>().unwrap(), level);
        }

        /// Anything that is not a level name is rejected
        #[test]
        fn test_unknown_names_rejected(name in "[a-z]{1,12}") {
            let known = Severity::ALL.iter().any(|l| l.as_str() == name);
            prop_assert_eq!(name.parse::<Severity>().is_ok(), known);
        }

        /// A record passes exactly when it is at or above the threshold and not `None`
        #[test]
        fn test_filter_matches_ordering(threshold in severity(), record in severity()) {
            let filter = SeverityFilter::new(threshold);
            prop_assert_eq!(
                filter.allows(record),
                record != Severity::None && record >= threshold
            );
        }

        /// A failed update leaves the threshold where it was
        #[test]
        fn test_failed_set_keeps_threshold(threshold in severity(), junk in "[0-9]{1,4}") {
            let filter = SeverityFilter::new(threshold);
            prop_assert!(filter.set_by_name(&junk).is_err());
            prop_assert_eq!(filter.get(), threshold);
        }
    }
}
