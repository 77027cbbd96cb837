use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{
    models::{
        badges::{ProfileBadge, ProfileBadgeView},
        decks::Deck,
        profiles::{Profile, ProfilePublic},
    },
    util::errors::{RouteError, SimpleRouteErrorOutput},
    AppState,
};

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_profile))
        .routes(routes!(get_profile_badges))
        .routes(routes!(get_profile_decks))
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    #[serde(flatten)]
    profile: ProfilePublic,
}

/// Get profile by ID
#[utoipa::path(
    method(get),
    path = "/{id}",
    params(
        ("id" = i32, Path, description = "ID of profile to get"),
    ),
    responses(
        (status = OK, description = "Success", body = ProfileResponse, content_type = "application/json"),
        (status = NOT_FOUND, description = "Profile not found", body = SimpleRouteErrorOutput, content_type = "application/json")
    )
)]
async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProfileResponse>, RouteError> {
    use crate::schema::profiles;

    let mut conn = state.db.get().await?;

    let profile: Profile = profiles::table.find(id).first(&mut conn).await?;

    Ok(Json(ProfileResponse {
        profile: profile.into(),
    }))
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ProfileBadgesResponse {
    badges: Vec<ProfileBadgeView>,
}

/// Get badges awarded to a profile
#[utoipa::path(
    method(get),
    path = "/{id}/badges",
    params(
        ("id" = i32, Path, description = "ID of profile to get badges for"),
    ),
    responses(
        (status = OK, description = "Success", body = ProfileBadgesResponse, content_type = "application/json"),
        (status = NOT_FOUND, description = "Profile not found", body = SimpleRouteErrorOutput, content_type = "application/json")
    )
)]
async fn get_profile_badges(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProfileBadgesResponse>, RouteError> {
    use crate::schema::profiles;

    let mut conn = state.db.get().await?;

    // 404 for unknown profiles instead of an empty list
    let profile: Profile = profiles::table.find(id).first(&mut conn).await?;
    let badges = ProfileBadge::views_for_profile(profile.id, &mut conn).await?;

    Ok(Json(ProfileBadgesResponse { badges }))
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ProfileDecksResponse {
    decks: Vec<Deck>,
}

/// Get decks registered by a profile
#[utoipa::path(
    method(get),
    path = "/{id}/decks",
    params(
        ("id" = i32, Path, description = "ID of profile to get decks for"),
    ),
    responses(
        (status = OK, description = "Success", body = ProfileDecksResponse, content_type = "application/json"),
        (status = NOT_FOUND, description = "Profile not found", body = SimpleRouteErrorOutput, content_type = "application/json")
    )
)]
async fn get_profile_decks(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProfileDecksResponse>, RouteError> {
    use crate::schema::profiles;

    let mut conn = state.db.get().await?;

    let profile: Profile = profiles::table.find(id).first(&mut conn).await?;
    let decks = Deck::all_of_profile(profile.id, &mut conn).await?;

    Ok(Json(ProfileDecksResponse { decks }))
}
