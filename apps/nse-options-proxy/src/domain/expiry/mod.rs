//! Expiry Dates
//!
//! NSE publishes contract expiries as `DD-Mon-YYYY` strings (for example
//! `27-Jun-2025`). This module parses them into calendar dates so they can
//! be ordered chronologically, while keeping the upstream spelling for
//! responses.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;

/// Format NSE uses for expiry dates.
pub const EXPIRY_DATE_FORMAT: &str = "%d-%b-%Y";

// =============================================================================
// Types
// =============================================================================

/// A contract expiry date as published by the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpiryDate {
    raw: String,
    date: NaiveDate,
}

impl ExpiryDate {
    /// Parse an expiry date in `DD-Mon-YYYY` format.
    ///
    /// # Errors
    ///
    /// Returns `ExpiryDateError::InvalidFormat` if the string is not a valid
    /// date in the expected format.
    pub fn parse(raw: &str) -> Result<Self, ExpiryDateError> {
        let trimmed = raw.trim();
        let date = NaiveDate::parse_from_str(trimmed, EXPIRY_DATE_FORMAT).map_err(|e| {
            ExpiryDateError::InvalidFormat {
                value: raw.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            raw: trimmed.to_string(),
            date,
        })
    }

    /// The calendar date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// The upstream spelling of the date.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Consume into the upstream spelling.
    #[must_use]
    pub fn into_string(self) -> String {
        self.raw
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialOrd for ExpiryDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExpiryDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Deduplicate expiry strings and sort them chronologically.
///
/// Two strings naming the same calendar date (e.g. `27-Jun-2025` and
/// `27-JUN-2025`) collapse into one entry; the first spelling seen wins.
/// The output is strictly ascending by date.
///
/// # Errors
///
/// Fails on the first string that does not parse as `DD-Mon-YYYY`.
pub fn sort_unique<I, S>(dates: I) -> Result<Vec<ExpiryDate>, ExpiryDateError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for raw in dates {
        let expiry = ExpiryDate::parse(raw.as_ref())?;
        if seen.insert(expiry.date) {
            unique.push(expiry);
        }
    }

    unique.sort_by_key(ExpiryDate::date);
    Ok(unique)
}

// =============================================================================
// Errors
// =============================================================================

/// Expiry date errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpiryDateError {
    /// The string is not a `DD-Mon-YYYY` date.
    #[error("invalid expiry date '{value}': {reason}")]
    InvalidFormat {
        /// The offending input.
        value: String,
        /// Parser message.
        reason: String,
    },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn strings(dates: &[ExpiryDate]) -> Vec<&str> {
        dates.iter().map(ExpiryDate::as_str).collect()
    }

    #[test_case("27-Jun-2025", 2025, 6, 27 ; "title case month")]
    #[test_case("04-Jul-2025", 2025, 7, 4 ; "zero padded day")]
    #[test_case("30-DEC-2025", 2025, 12, 30 ; "upper case month")]
    #[test_case(" 01-Jan-2026 ", 2026, 1, 1 ; "surrounding whitespace")]
    fn parse_valid(raw: &str, year: i32, month: u32, day: u32) {
        let expiry = ExpiryDate::parse(raw).unwrap();
        assert_eq!(
            expiry.date(),
            NaiveDate::from_ymd_opt(year, month, day).unwrap()
        );
        assert_eq!(expiry.as_str(), raw.trim());
    }

    #[test_case("2025-06-27" ; "iso format")]
    #[test_case("31-Feb-2025" ; "impossible day")]
    #[test_case("27-Juin-2025" ; "unknown month")]
    #[test_case("" ; "empty")]
    fn parse_invalid(raw: &str) {
        let err = ExpiryDate::parse(raw).unwrap_err();
        assert!(matches!(err, ExpiryDateError::InvalidFormat { .. }));
        assert!(err.to_string().contains("invalid expiry date"));
    }

    #[test]
    fn sort_unique_dedupes_and_orders() {
        let sorted = sort_unique(["27-Jun-2025", "04-Jul-2025", "27-Jun-2025"]).unwrap();
        assert_eq!(strings(&sorted), vec!["27-Jun-2025", "04-Jul-2025"]);
    }

    #[test]
    fn sort_unique_orders_across_years() {
        let sorted = sort_unique(["02-Jan-2026", "30-Dec-2025", "25-Sep-2025"]).unwrap();
        assert_eq!(
            strings(&sorted),
            vec!["25-Sep-2025", "30-Dec-2025", "02-Jan-2026"]
        );
    }

    #[test]
    fn sort_unique_collapses_same_date_spellings() {
        let sorted = sort_unique(["27-Jun-2025", "27-JUN-2025"]).unwrap();
        assert_eq!(strings(&sorted), vec!["27-Jun-2025"]);
    }

    #[test]
    fn sort_unique_empty() {
        let sorted = sort_unique(Vec::<String>::new()).unwrap();
        assert!(sorted.is_empty());
    }

    #[test]
    fn sort_unique_rejects_bad_date() {
        let err = sort_unique(["27-Jun-2025", "June 27"]).unwrap_err();
        let ExpiryDateError::InvalidFormat { value, .. } = err;
        assert_eq!(value, "June 27");
    }

    fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (2020i32..2030, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default())
    }

    proptest! {
        #[test]
        fn sort_unique_is_strictly_ascending(
            dates in proptest::collection::vec(arb_date(), 0..40),
            dup_every in 1usize..4,
        ) {
            let mut raw: Vec<String> = dates
                .iter()
                .map(|d| d.format(EXPIRY_DATE_FORMAT).to_string())
                .collect();
            let duplicates: Vec<String> = raw.iter().step_by(dup_every).cloned().collect();
            raw.extend(duplicates);

            let sorted = sort_unique(&raw).unwrap();

            for pair in sorted.windows(2) {
                prop_assert!(pair[0].date() < pair[1].date());
            }

            let distinct: HashSet<NaiveDate> = dates.iter().copied().collect();
            prop_assert_eq!(sorted.len(), distinct.len());
        }
    }
}
