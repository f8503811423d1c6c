//! DVD category and producer listings

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::catalog::{DvdCategory, Producer},
    AppState,
};

use super::AuthenticatedUser;

pub async fn list_categories(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<DvdCategory>>> {
    let categories = state.services.catalog.list_dvd_categories().await?;
    Ok(Json(categories))
}

pub async fn list_producers(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Producer>>> {
    let producers = state.services.catalog.list_producers().await?;
    Ok(Json(producers))
}
