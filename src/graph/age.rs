//! Whole-year age arithmetic.

use chrono::{Datelike, Local, NaiveDate};

use crate::types::Person;

/// Age in completed years.
///
/// Measured to the death date when present, otherwise to `reference`. The
/// year difference drops by one when the end date's (month, day) falls
/// before the birth date's. Absent birth date → `None`.
pub fn compute_age(
    birth: Option<NaiveDate>,
    death: Option<NaiveDate>,
    reference: NaiveDate,
) -> Option<i32> {
    let birth = birth?;
    let end = death.unwrap_or(reference);
    let mut age = end.year() - birth.year();
    if (end.month(), end.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    Some(age)
}

/// [`compute_age`] for a person record.
pub fn age_of(person: &Person, reference: NaiveDate) -> Option<i32> {
    compute_age(person.birth_date, person.death_date, reference)
}

/// Today's date in local time, the default reference for ages.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test_case("2000-06-15", None, "2024-06-14" => Some(23) ; "day before birthday")]
    #[test_case("2000-06-15", None, "2024-06-15" => Some(24) ; "on birthday")]
    #[test_case("2000-06-15", None, "2024-07-01" => Some(24) ; "month after")]
    #[test_case("1950-01-01", Some("1980-01-01"), "2024-06-15" => Some(30) ; "death caps age")]
    #[test_case("1950-03-10", Some("1980-03-09"), "2024-06-15" => Some(29) ; "died day before birthday")]
    #[test_case("2000-02-29", None, "2023-02-28" => Some(22) ; "leap birthday in common year")]
    #[test_case("2000-02-29", None, "2023-03-01" => Some(23) ; "leap birthday after feb")]
    #[test_case("2024-06-15", None, "2024-06-15" => Some(0) ; "born today")]
    fn ages(birth: &str, death: Option<&str>, reference: &str) -> Option<i32> {
        compute_age(Some(d(birth)), death.map(d), d(reference))
    }

    #[test]
    fn absent_birth_is_absent_age() {
        assert_eq!(compute_age(None, Some(d("1980-01-01")), d("2024-01-01")), None);
        assert_eq!(compute_age(None, None, d("2024-01-01")), None);
    }

    #[test]
    fn reference_before_birth_goes_negative() {
        assert_eq!(
            compute_age(Some(d("2030-01-01")), None, d("2024-01-01")),
            Some(-6)
        );
    }
}
