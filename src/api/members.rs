//! Member management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{
        loan::{InactiveMember, LetterGroup, MemberLoanHistory},
        member::{LoanEligibility, MemberWithCategory, RegisterMember, UpdateMember},
    },
    AppState,
};

use super::AuthenticatedUser;

/// Register response
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: i32,
    pub message: String,
}

/// Target member for PUT and DELETE
#[derive(Deserialize)]
pub struct MemberIdParams {
    pub member_id: i32,
}

/// Register a new member (and optionally a new membership category)
pub async fn register_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<RegisterMember>,
) -> AppResult<Json<RegisterResponse>> {
    tracing::debug!(staff = %claims.sub, "Member registration requested");

    let registered = state.services.members.register_member(input).await?;

    Ok(Json(RegisterResponse {
        id: registered.id,
        message: format!("Added new member with id {}", registered.id),
    }))
}

/// List all members with their membership category
pub async fn list_members(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<MemberWithCategory>>> {
    let members = state.services.members.list_members().await?;
    Ok(Json(members))
}

/// Member name and current loans; `null` for an unknown id
pub async fn get_member(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Option<MemberLoanHistory>>> {
    let member = state.services.members.get_member(id).await?;
    Ok(Json(member))
}

/// Members with an exact last-name match
pub async fn search_members(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(last_name): Path<String>,
) -> AppResult<Json<Vec<MemberLoanHistory>>> {
    let members = state.services.members.search_by_last_name(&last_name).await?;
    Ok(Json(members))
}

/// Members with their age eligibility for loans
pub async fn list_for_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanEligibility>>> {
    let members = state.services.members.list_for_loan_decision().await?;
    Ok(Json(members))
}

/// Replace a member record
pub async fn update_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(params): Query<MemberIdParams>,
    Json(member): Json<UpdateMember>,
) -> AppResult<()> {
    tracing::debug!(staff = %claims.sub, member_id = params.member_id, "Member update requested");

    state.services.members.update_member(params.member_id, member).await
}

/// Delete a member
pub async fn delete_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(params): Query<MemberIdParams>,
) -> AppResult<()> {
    tracing::debug!(staff = %claims.sub, member_id = params.member_id, "Member deletion requested");

    state.services.members.delete_member(params.member_id).await
}

/// Loan summaries grouped by first-name initial
pub async fn list_with_loans(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LetterGroup>>> {
    let groups = state.services.members.list_with_loan_summary().await?;
    Ok(Json(groups))
}

/// Members whose last loan is older than the lending window
pub async fn list_inactive(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<InactiveMember>>> {
    let members = state.services.members.list_inactive().await?;
    Ok(Json(members))
}
