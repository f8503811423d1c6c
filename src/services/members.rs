//! Member lifecycle and loan reporting service

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{InactiveMember, LetterGroup, MemberLoanHistory},
        member::{
            LoanEligibility, Member, MemberWithCategory, NewMember, NewMembershipCategory,
            RegisterMember, RegisteredMember, UpdateMember,
        },
    },
    repository::MemberStore,
    services::{eligibility, images, loan_status},
};

pub const UNDERAGE_MESSAGE: &str = "You need to be 13 or older to be a member!";
pub const REGISTRATION_FAILED_MESSAGE: &str = "Could not add member. Contact Admin!";

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Clone)]
pub struct MembersService {
    store: Arc<dyn MemberStore>,
}

impl MembersService {
    pub fn new(store: Arc<dyn MemberStore>) -> Self {
        Self { store }
    }

    /// Register a member, creating its membership category first when the
    /// supplied category has id 0. Both rows are written or neither is.
    pub async fn register_member(&self, input: RegisterMember) -> AppResult<RegisteredMember> {
        input.validate()?;

        if !eligibility::is_eligible(input.date_of_birth, today()) {
            return Err(AppError::BusinessRule(UNDERAGE_MESSAGE.to_string()));
        }

        let category = &input.membership_category;
        if category.is_new() {
            if category.description.trim().is_empty() {
                return Err(AppError::Validation(
                    "Membership category description is required".to_string(),
                ));
            }
            category.validate()?;
        }

        match self.write_registration(input).await {
            Ok(registered) => {
                tracing::info!(
                    member_id = registered.id,
                    category_id = registered.category_id,
                    "Registered new member"
                );
                Ok(registered)
            }
            Err(AppError::NotFound(msg)) => Err(AppError::NotFound(msg)),
            Err(e) => {
                tracing::error!("Member registration rolled back: {}", e);
                Err(AppError::Persistence(REGISTRATION_FAILED_MESSAGE.to_string()))
            }
        }
    }

    async fn write_registration(&self, input: RegisterMember) -> AppResult<RegisteredMember> {
        let mut uow = self.store.begin().await?;

        let category = input.membership_category;
        let category_id = if category.is_new() {
            uow.insert_category(&NewMembershipCategory {
                description: category.description,
                total_loans: category.total_loans,
            })
            .await?
        } else if uow.category_exists(category.id).await? {
            category.id
        } else {
            return Err(AppError::NotFound(format!(
                "Membership category with id {} not found!",
                category.id
            )));
        };

        let (profile_image, image_warning) = match input.profile_image {
            Some(raw) => {
                let normalized = images::normalize_profile_image_blocking(raw).await;
                let warning = normalized.warning.map(|w| {
                    tracing::warn!("Storing profile image unmodified: {}", w);
                    w.to_string()
                });
                (Some(normalized.value), warning)
            }
            None => (None, None),
        };

        let member_id = uow
            .insert_member(&NewMember {
                category_id,
                first_name: input.first_name,
                last_name: input.last_name,
                address: input.address,
                date_of_birth: input.date_of_birth,
                profile_image,
            })
            .await?;

        uow.commit().await?;

        Ok(RegisteredMember {
            id: member_id,
            category_id,
            image_warning,
        })
    }

    /// All members with their category
    pub async fn list_members(&self) -> AppResult<Vec<MemberWithCategory>> {
        self.store.list_members().await
    }

    /// Member name and current loans, `None` when the member does not exist
    pub async fn get_member(&self, id: i32) -> AppResult<Option<MemberLoanHistory>> {
        let today = today();
        Ok(self
            .store
            .get_aggregate(id)
            .await?
            .map(|aggregate| loan_status::loan_history(&aggregate, today)))
    }

    /// Exact last-name search, same shape as [`Self::get_member`]
    pub async fn search_by_last_name(&self, last_name: &str) -> AppResult<Vec<MemberLoanHistory>> {
        let today = today();
        let aggregates = self.store.find_aggregates_by_last_name(last_name).await?;
        Ok(aggregates
            .iter()
            .map(|aggregate| loan_status::loan_history(aggregate, today))
            .collect())
    }

    /// Every member with a flag telling whether they are old enough to borrow
    pub async fn list_for_loan_decision(&self) -> AppResult<Vec<LoanEligibility>> {
        let today = today();
        let members = self.store.list_members().await?;
        Ok(members
            .into_iter()
            .map(|m| LoanEligibility {
                member_id: m.member.id,
                member_name: m.member.display_name(),
                is_of_age: eligibility::is_eligible(m.member.date_of_birth, today),
            })
            .collect())
    }

    /// Replace a member record
    pub async fn update_member(&self, id: i32, update: UpdateMember) -> AppResult<()> {
        if id != update.id {
            return Err(AppError::IdentityMismatch);
        }
        update.validate()?;

        if !self.store.member_exists(id).await? {
            return Err(AppError::NotFound(format!("Member with id {} not found!", id)));
        }
        if !self.store.category_exists(update.category_id).await? {
            return Err(AppError::NotFound(format!(
                "Membership category with id {} not found!",
                update.category_id
            )));
        }

        self.store.update_member(&Member::from(update)).await?;
        tracing::info!(member_id = id, "Updated member");
        Ok(())
    }

    /// Delete a member (loans go with it)
    pub async fn delete_member(&self, id: i32) -> AppResult<()> {
        if !self.store.member_exists(id).await? {
            return Err(AppError::NotFound(format!("Member with id {} not found!", id)));
        }

        self.store.delete_member(id).await?;
        tracing::info!(member_id = id, "Deleted member");
        Ok(())
    }

    /// Loan counters and limit status, grouped by first-name initial
    pub async fn list_with_loan_summary(&self) -> AppResult<Vec<LetterGroup>> {
        let aggregates = self.store.list_aggregates().await?;
        Ok(loan_status::group_by_initial(&aggregates))
    }

    /// Members with no loan activity inside the lending window
    pub async fn list_inactive(&self) -> AppResult<Vec<InactiveMember>> {
        let aggregates = self.store.list_aggregates().await?;
        Ok(loan_status::inactive_members(&aggregates, today()))
    }
}
