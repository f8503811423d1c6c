//! Loan status derivation
//!
//! Everything here works on member aggregates already loaded from the
//! store and on an explicit `today`, so each view is recomputed per request.

use chrono::{Days, NaiveDate};
use indexmap::IndexMap;

use crate::models::{
    loan::{InactiveMember, LetterGroup, LimitStatus, LoanView, MemberLoanHistory, MemberLoanSummary},
    member::MemberAggregate,
};

/// Days after checkout during which a loan is still considered current
pub const LENDING_WINDOW_DAYS: u64 = 31;

pub const NOT_RETURNED: &str = "Not Returned";

pub const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

fn lending_window_end(date_out: NaiveDate) -> NaiveDate {
    date_out
        .checked_add_days(Days::new(LENDING_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// True while `date_out + 31 days` has not passed
pub fn within_lending_window(date_out: NaiveDate, today: NaiveDate) -> bool {
    lending_window_end(date_out) >= today
}

/// Member name and the loans still inside the lending window
pub fn loan_history(aggregate: &MemberAggregate, today: NaiveDate) -> MemberLoanHistory {
    let loans = aggregate
        .loans
        .iter()
        .filter(|record| within_lending_window(record.loan.date_out, today))
        .map(|record| LoanView {
            loan_id: record.loan.id,
            dvd_title: record.dvd_title.clone(),
            copy_id: record.loan.copy_id,
            date_out: record.loan.date_out,
            date_due: record.loan.date_due,
            returned_date: record
                .loan
                .date_returned
                .map(format_date)
                .unwrap_or_else(|| NOT_RETURNED.to_string()),
        })
        .collect();

    MemberLoanHistory {
        member_name: aggregate.member.display_name(),
        loans,
    }
}

pub fn limit_status(current_loan_count: usize, allowed: i32) -> LimitStatus {
    if current_loan_count as i64 > i64::from(allowed) {
        LimitStatus::LimitCrossed
    } else {
        LimitStatus::Ok
    }
}

pub fn summarize(aggregate: &MemberAggregate) -> MemberLoanSummary {
    let current_loan_count = aggregate.loans.iter().filter(|r| r.loan.is_active()).count();

    MemberLoanSummary {
        member_id: aggregate.member.id,
        first_name: aggregate.member.first_name.clone(),
        last_name: aggregate.member.last_name.clone(),
        membership_category: aggregate.category.description.clone(),
        date_of_birth: format_date(aggregate.member.date_of_birth),
        limit_status: limit_status(current_loan_count, aggregate.category.total_loans),
        total_loans: aggregate.loans.len(),
        current_loan_count,
    }
}

/// Loan summaries sorted by first name (case-insensitive) and grouped by
/// lower-cased initial. Groups appear in the order of their first member.
pub fn group_by_initial(aggregates: &[MemberAggregate]) -> Vec<LetterGroup> {
    let mut summaries: Vec<MemberLoanSummary> = aggregates.iter().map(summarize).collect();
    summaries.sort_by_cached_key(|s| s.first_name.to_lowercase());

    let mut groups: IndexMap<char, Vec<MemberLoanSummary>> = IndexMap::new();
    for summary in summaries {
        let Some(initial) = summary.first_name.to_lowercase().chars().next() else {
            continue;
        };
        groups.entry(initial).or_default().push(summary);
    }

    groups
        .into_iter()
        .map(|(alphabet, member_list)| LetterGroup { alphabet, member_list })
        .collect()
}

/// Members whose latest loan left the lending window, oldest first.
///
/// Members who never borrowed anything are not part of the report.
pub fn inactive_members(aggregates: &[MemberAggregate], today: NaiveDate) -> Vec<InactiveMember> {
    let mut inactive: Vec<(NaiveDate, InactiveMember)> = aggregates
        .iter()
        .filter_map(|aggregate| {
            let latest = aggregate.loans.iter().max_by_key(|r| r.loan.date_out)?;
            let date_out = latest.loan.date_out;
            if lending_window_end(date_out) >= today {
                return None;
            }

            Some((
                date_out,
                InactiveMember {
                    first_name: aggregate.member.first_name.clone(),
                    last_name: aggregate.member.last_name.clone(),
                    address: aggregate.member.address.clone(),
                    recent_dvd_title: latest.dvd_title.clone(),
                    days_since_loan: (today - date_out).num_days(),
                    date_out: format_date(date_out),
                    member_image: aggregate.member.profile_image.clone(),
                },
            ))
        })
        .collect();

    inactive.sort_by_key(|(date_out, _)| *date_out);
    inactive.into_iter().map(|(_, member)| member).collect()
}
