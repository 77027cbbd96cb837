use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use validator::Validate;

use crate::{
    models::decks::{Deck, NewDeck},
    util::{
        errors::{IntoRouteError, RouteError, SimpleRouteErrorOutput},
        jwt::Claims,
    },
    AppState,
};

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(register_deck))
}

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RegisterDeckRequest {
    #[validate(length(min = 1, max = 120))]
    name: String,
    /// Commander card name for commander-format decks.
    commander: Option<String>,
}

/// Register a deck for the authenticated profile
#[utoipa::path(
    method(post),
    path = "/",
    request_body = RegisterDeckRequest,
    responses(
        (status = OK, description = "Success", body = Deck, content_type = "application/json"),
        (status = BAD_REQUEST, description = "Invalid parameters", body = SimpleRouteErrorOutput, content_type = "application/json"),
        (status = UNAUTHORIZED, description = "Unauthorized", body = SimpleRouteErrorOutput, content_type = "application/json"),
    ),
    security(
        ("token_jwt" = [])
    )
)]
async fn register_deck(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<RegisterDeckRequest>,
) -> Result<Json<Deck>, RouteError> {
    payload
        .validate()
        .http_error("Invalid deck name", axum::http::StatusCode::BAD_REQUEST)?;

    let mut conn = state.db.get().await?;

    let deck = NewDeck::new(
        claims.profile.id,
        &payload.name,
        payload.commander.as_deref(),
    )
    .create(&mut conn)
    .await?;

    Ok(Json(deck))
}
