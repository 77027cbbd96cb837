use axum::{extract::State, Json, Router};
use diesel_async::RunQueryDsl;
use serde::Serialize;
use utoipa::{openapi::OpenApi, OpenApi as OpenApiTrait, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{util::errors::RouteError, AppState};

mod badges;
mod decks;
mod events;
mod matches;
mod profiles;

#[derive(OpenApiTrait)]
#[openapi(servers((url = "/api")), security(
    (),
    ("token_jwt" = [])
))]
pub struct ApiDoc;

pub fn routes() -> (Router<AppState>, OpenApi) {
    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health_check))
        .nest("/profiles", profiles::routes())
        .nest("/decks", decks::routes())
        .nest("/events", events::routes())
        .nest("/badges", badges::routes())
        .nest("/matches", matches::routes())
        .split_for_parts()
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct HealthCheck {
    status: &'static str,
    badge_catalog: String,
}

/// Get health of the API.
#[utoipa::path(
    method(get),
    path = "/healthCheck",
    responses(
        (status = OK, description = "Success", body = HealthCheck, content_type = "application/json")
    )
)]
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthCheck>, RouteError> {
    use diesel::QueryDsl;

    use crate::schema::badges;

    let mut conn = state.db.get().await?;
    let catalog_size: i64 = badges::table.count().get_result(&mut conn).await?;

    Ok(Json(HealthCheck {
        status: "ok",
        badge_catalog: format!("{catalog_size} badge(s)"),
    }))
}
