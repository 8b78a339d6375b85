//! Download file-name derivation.

use chrono::{DateTime, Duration, Utc};

/// Derive the download file name from a document title and a timestamp.
///
/// The title collapses to PascalCase and the timestamp, shifted by the
/// caller's UTC offset, formats as `DD MM YYYY HHmmss` with the spaces
/// snaked to underscores:
///
/// `"lorem ipsum sit amet"` at 2016-09-30 03:12:04 becomes
/// `"LoremIpsumSitAmet_30_09_2016_031204.xls"`.
///
/// Deterministic for fixed inputs. An empty or whitespace-only title yields
/// a name of the form `"_{date}.xls"`.
pub fn generate_file_name(title: &str, now: DateTime<Utc>, utc_offset_minutes: i32) -> String {
    let shifted = now + Duration::minutes(i64::from(utc_offset_minutes));
    let stamp = shifted
        .format("%d %m %Y %H%M%S")
        .to_string()
        .replace(' ', "_");

    format!("{}_{}.xls", pascal_case(title), stamp)
}

/// Split on non-alphanumeric boundaries, upper-case the first letter of each
/// segment, lower-case the rest, concatenate with no separators.
fn pascal_case(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pascal_case_spaces() {
        assert_eq!(pascal_case("lorem ipsum sit amet"), "LoremIpsumSitAmet");
    }

    #[test]
    fn test_pascal_case_mixed_separators() {
        assert_eq!(pascal_case("monthly-report_2016"), "MonthlyReport2016");
    }

    #[test]
    fn test_pascal_case_flattens_shouting() {
        assert_eq!(pascal_case("ORDER EXPORT"), "OrderExport");
    }

    #[test]
    fn test_pascal_case_empty() {
        assert_eq!(pascal_case(""), "");
        assert_eq!(pascal_case("   "), "");
    }

    #[test]
    fn test_offset_shifts_the_stamp() {
        let now = Utc.with_ymd_and_hms(2016, 9, 30, 23, 42, 4).unwrap();
        // +90 minutes crosses midnight into the next day
        assert_eq!(
            generate_file_name("x", now, 90),
            "X_01_10_2016_011204.xls"
        );
    }
}
