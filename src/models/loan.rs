//! Loan model and the views derived from loan history

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i32,
    pub copy_id: i32,
    pub member_id: i32,
    pub date_out: NaiveDate,
    pub date_due: NaiveDate,
    pub date_returned: Option<NaiveDate>,
}

impl Loan {
    /// A loan is active until a return date is recorded
    pub fn is_active(&self) -> bool {
        self.date_returned.is_none()
    }
}

/// Internal row structure for loan + copy + DVD joins
#[derive(Debug, Clone, FromRow)]
pub struct LoanTitleRow {
    id: i32,
    copy_id: i32,
    member_id: i32,
    date_out: NaiveDate,
    date_due: NaiveDate,
    date_returned: Option<NaiveDate>,
    dvd_title: String,
}

/// Loan together with the title of the borrowed DVD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRecord {
    pub loan: Loan,
    pub dvd_title: String,
}

impl From<LoanTitleRow> for LoanRecord {
    fn from(row: LoanTitleRow) -> Self {
        LoanRecord {
            loan: Loan {
                id: row.id,
                copy_id: row.copy_id,
                member_id: row.member_id,
                date_out: row.date_out,
                date_due: row.date_due,
                date_returned: row.date_returned,
            },
            dvd_title: row.dvd_title,
        }
    }
}

/// Loan line in a member detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanView {
    pub loan_id: i32,
    pub dvd_title: String,
    pub copy_id: i32,
    pub date_out: NaiveDate,
    pub date_due: NaiveDate,
    /// Formatted return date, or "Not Returned"
    pub returned_date: String,
}

/// Member detail view: name and loans still inside the lending window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberLoanHistory {
    pub member_name: String,
    pub loans: Vec<LoanView>,
}

/// Whether a member holds more active loans than the category allows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LimitStatus {
    #[serde(rename = "Ok")]
    Ok,
    #[serde(rename = "Limit Crossed")]
    LimitCrossed,
}

/// Per-member loan counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberLoanSummary {
    pub member_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub membership_category: String,
    pub date_of_birth: String,
    pub limit_status: LimitStatus,
    pub total_loans: usize,
    pub current_loan_count: usize,
}

/// Loan summaries sharing the same first-name initial
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LetterGroup {
    pub alphabet: char,
    pub member_list: Vec<MemberLoanSummary>,
}

/// Entry of the inactivity report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InactiveMember {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub recent_dvd_title: String,
    pub days_since_loan: i64,
    pub date_out: String,
    pub member_image: Option<String>,
}
