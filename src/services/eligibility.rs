//! Membership age rule

use chrono::{Months, NaiveDate};

/// Minimum age, in whole years, to hold a membership or take out a loan
pub const MINIMUM_AGE_YEARS: u32 = 13;

/// True once the member has reached [`MINIMUM_AGE_YEARS`] on `today`.
///
/// Someone born on 29 February comes of age on 28 February in non-leap
/// years.
pub fn is_eligible(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    date_of_birth
        .checked_add_months(Months::new(MINIMUM_AGE_YEARS * 12))
        .map(|coming_of_age| coming_of_age <= today)
        .unwrap_or(false)
}
