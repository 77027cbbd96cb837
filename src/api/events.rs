use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use validator::Validate;

use crate::{
    models::{
        events::{Event, EventMember, NewEvent},
        profiles::{Profile, ProfilePublic},
    },
    util::{
        errors::{IntoRouteError, RouteError, SimpleRouteErrorOutput},
        game_types::MemberRole,
        jwt::Claims,
    },
    AppState,
};

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_event))
        .routes(routes!(create_event))
        .routes(routes!(join_event))
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct EventMemberView {
    #[serde(flatten)]
    profile: ProfilePublic,
    role: MemberRole,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct EventResponse {
    #[serde(flatten)]
    event: Event,
    members: Vec<EventMemberView>,
}

/// Get event by ID, with its member list
#[utoipa::path(
    method(get),
    path = "/{id}",
    params(
        ("id" = i32, Path, description = "ID of event to get"),
    ),
    responses(
        (status = OK, description = "Success", body = EventResponse, content_type = "application/json"),
        (status = NOT_FOUND, description = "Event not found", body = SimpleRouteErrorOutput, content_type = "application/json")
    )
)]
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventResponse>, RouteError> {
    use crate::schema::{event_members, events, profiles};

    let mut conn = state.db.get().await?;

    let event: Event = events::table.find(id).first(&mut conn).await?;

    let members: Vec<(EventMember, Profile)> = event_members::table
        .inner_join(profiles::table)
        .filter(event_members::event_id.eq(event.id))
        .order(event_members::joined_at.asc())
        .select((EventMember::as_select(), Profile::as_select()))
        .load(&mut conn)
        .await?;

    let members = members
        .into_iter()
        .map(|(member, profile)| EventMemberView {
            profile: profile.into(),
            role: member.role,
        })
        .collect();

    Ok(Json(EventResponse { event, members }))
}

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
struct CreateEventRequest {
    #[validate(length(min = 1, max = 120))]
    name: String,
    #[serde(default)]
    description: String,
}

/// Create an event owned by the authenticated profile
#[utoipa::path(
    method(post),
    path = "/",
    request_body = CreateEventRequest,
    responses(
        (status = OK, description = "Success", body = Event, content_type = "application/json"),
        (status = BAD_REQUEST, description = "Invalid parameters", body = SimpleRouteErrorOutput, content_type = "application/json"),
        (status = UNAUTHORIZED, description = "Unauthorized", body = SimpleRouteErrorOutput, content_type = "application/json"),
    ),
    security(
        ("token_jwt" = [])
    )
)]
async fn create_event(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateEventRequest>,
) -> Result<Json<Event>, RouteError> {
    payload
        .validate()
        .http_error("Invalid event name", axum::http::StatusCode::BAD_REQUEST)?;

    let mut conn = state.db.get().await?;

    let event = NewEvent::new(claims.profile.id, &payload.name, &payload.description)
        .create(&mut conn)
        .await?;

    Ok(Json(event))
}

/// Join an event as a player
#[utoipa::path(
    method(post),
    path = "/{id}/join",
    params(
        ("id" = i32, Path, description = "ID of event to join"),
    ),
    responses(
        (status = OK, description = "Success"),
        (status = NOT_FOUND, description = "Event not found", body = SimpleRouteErrorOutput, content_type = "application/json"),
        (status = CONFLICT, description = "Already a member", body = SimpleRouteErrorOutput, content_type = "application/json"),
        (status = UNAUTHORIZED, description = "Unauthorized", body = SimpleRouteErrorOutput, content_type = "application/json"),
    ),
    security(
        ("token_jwt" = [])
    )
)]
async fn join_event(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<(), RouteError> {
    use crate::schema::{event_members, events};

    let mut conn = state.db.get().await?;

    let event: Event = events::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(RouteError::new_not_found)?;

    let inserted = diesel::insert_into(event_members::table)
        .values((
            event_members::event_id.eq(event.id),
            event_members::profile_id.eq(claims.profile.id),
            event_members::role.eq(MemberRole::Player),
        ))
        .on_conflict_do_nothing()
        .execute(&mut conn)
        .await?;

    if inserted == 0 {
        return Err(RouteError::new_conflict().set_public_error_message("Already a member"));
    }

    Ok(())
}
