//! Data models for Ropey

pub mod auth;
pub mod catalog;
pub mod loan;
pub mod member;

// Re-export commonly used types
pub use auth::AccessClaims;
pub use catalog::{DvdCategory, Producer};
pub use loan::{Loan, LoanRecord};
pub use member::{Member, MemberAggregate, MemberWithCategory, MembershipCategory};
