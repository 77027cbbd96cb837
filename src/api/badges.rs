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
    models::badges::Badge,
    util::errors::{RouteError, SimpleRouteErrorOutput},
    AppState,
};

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_badges))
        .routes(routes!(get_badge))
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct BadgeCatalogResponse {
    badges: Vec<Badge>,
}

/// Get the badge catalog
#[utoipa::path(
    method(get),
    path = "/",
    responses(
        (status = OK, description = "Success", body = BadgeCatalogResponse, content_type = "application/json"),
    )
)]
async fn get_badges(State(state): State<AppState>) -> Result<Json<BadgeCatalogResponse>, RouteError> {
    use crate::schema::badges;

    let mut conn = state.db.get().await?;

    let badges: Vec<Badge> = badges::table
        .order(badges::slug.asc())
        .load(&mut conn)
        .await?;

    Ok(Json(BadgeCatalogResponse { badges }))
}

/// Get badge by slug
#[utoipa::path(
    method(get),
    path = "/{slug}",
    params(
        ("slug" = String, Path, description = "Slug of badge to get"),
    ),
    responses(
        (status = OK, description = "Success", body = Badge, content_type = "application/json"),
        (status = NOT_FOUND, description = "Badge not found", body = SimpleRouteErrorOutput, content_type = "application/json")
    )
)]
async fn get_badge(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Badge>, RouteError> {
    let mut conn = state.db.get().await?;

    let badge = Badge::find_by_slug(&slug, &mut conn)
        .await?
        .ok_or_else(RouteError::new_not_found)?;

    Ok(Json(badge))
}
