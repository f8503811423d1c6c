//! Member model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::loan::LoanRecord;

/// Membership tier, bounding how many loans a member may hold at once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MembershipCategory {
    pub id: i32,
    pub description: String,
    pub total_loans: i32,
}

/// Member model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i32,
    pub category_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub profile_image: Option<String>,
}

impl Member {
    /// "First Last", as shown to loan-desk staff
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Internal row structure for member + category joins
#[derive(Debug, Clone, FromRow)]
pub struct MemberCategoryRow {
    id: i32,
    category_id: i32,
    first_name: String,
    last_name: String,
    address: String,
    date_of_birth: NaiveDate,
    profile_image: Option<String>,
    category_description: String,
    category_total_loans: i32,
}

/// Member with its membership category joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberWithCategory {
    #[serde(flatten)]
    pub member: Member,
    pub category: MembershipCategory,
}

impl From<MemberCategoryRow> for MemberWithCategory {
    fn from(row: MemberCategoryRow) -> Self {
        MemberWithCategory {
            category: MembershipCategory {
                id: row.category_id,
                description: row.category_description,
                total_loans: row.category_total_loans,
            },
            member: Member {
                id: row.id,
                category_id: row.category_id,
                first_name: row.first_name,
                last_name: row.last_name,
                address: row.address,
                date_of_birth: row.date_of_birth,
                profile_image: row.profile_image,
            },
        }
    }
}

/// Member with category and complete loan history (each loan carrying its DVD title)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAggregate {
    pub member: Member,
    pub category: MembershipCategory,
    pub loans: Vec<LoanRecord>,
}

/// Category supplied at registration; id 0 asks for a new category.
///
/// Field rules only matter for a new category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MembershipCategoryInput {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    #[validate(length(max = 100, message = "Membership category description must be at most 100 characters"))]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "Membership category loan limit cannot be negative"))]
    pub total_loans: i32,
}

impl MembershipCategoryInput {
    pub fn is_new(&self) -> bool {
        self.id == 0
    }
}

/// Register member request.
///
/// Identity fields (username, email, password) may be present in the same
/// payload; they belong to the identity provider and are ignored here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterMember {
    #[validate(length(min = 1, max = 30, message = "First name must be 1 to 30 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "Last name must be 1 to 30 characters"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 200, message = "Address must be 1 to 200 characters"))]
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub membership_category: MembershipCategoryInput,
    pub profile_image: Option<String>,
}

/// New category row, ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembershipCategory {
    pub description: String,
    pub total_loans: i32,
}

/// New member row, ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub category_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub profile_image: Option<String>,
}

/// Full member replacement (PUT); `id` must match the targeted member
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMember {
    pub id: i32,
    pub category_id: i32,
    #[validate(length(min = 1, max = 30, message = "First name must be 1 to 30 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "Last name must be 1 to 30 characters"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 200, message = "Address must be 1 to 200 characters"))]
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub profile_image: Option<String>,
}

impl From<UpdateMember> for Member {
    fn from(update: UpdateMember) -> Self {
        Member {
            id: update.id,
            category_id: update.category_id,
            first_name: update.first_name,
            last_name: update.last_name,
            address: update.address,
            date_of_birth: update.date_of_birth,
            profile_image: update.profile_image,
        }
    }
}

/// Outcome of a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredMember {
    pub id: i32,
    pub category_id: i32,
    /// Set when the profile image could not be normalized and was stored as sent
    pub image_warning: Option<String>,
}

/// Entry of the loan-desk eligibility listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanEligibility {
    pub member_id: i32,
    pub member_name: String,
    pub is_of_age: bool,
}
