use axum::{
    extract::{Path, Query, State},
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use validator::Validate;

use crate::{
    models::{
        badges::Badge,
        matches::{Match, MatchParticipant},
        profiles::{Profile, ProfilePublic},
    },
    play::{
        record::{record_casual_match, RecordError},
        submission::MatchSubmission,
    },
    util::{
        errors::{IntoRouteError, RouteError, SimpleRouteErrorOutput},
        game_types::{GameType, ProfileRole},
        jwt::Claims,
        query::SortType,
        views::invalidate_views,
    },
    AppState,
};

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_match, delete_match))
        .routes(routes!(get_matches, record_match))
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ParticipantResult {
    #[serde(flatten)]
    participant: MatchParticipant,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<ProfilePublic>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct MatchResponse {
    #[serde(flatten)]
    match_info: Match,
    participants: Vec<ParticipantResult>,
}

#[serde_inline_default]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetMatchParams {
    #[serde_inline_default(true)]
    with_profiles: bool,
}

/// Get match by ID, with its participants
#[utoipa::path(
    method(get),
    path = "/{id}",
    params(
        ("id" = i32, Path, description = "ID of match to get"),
        ("withProfiles" = Option<bool>, Query, description = "Include participant profile info"),
    ),
    responses(
        (status = OK, description = "Success", body = MatchResponse, content_type = "application/json"),
        (status = NOT_FOUND, description = "Match not found", body = SimpleRouteErrorOutput, content_type = "application/json")
    )
)]
async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    query: Query<GetMatchParams>,
) -> Result<Json<MatchResponse>, RouteError> {
    use crate::schema::{match_participants, matches, profiles};

    let mut conn = state.db.get().await?;

    let match_info: Match = matches::table
        .find(id)
        .first::<Match>(&mut conn)
        .await
        .optional()?
        .ok_or_else(RouteError::new_not_found)?;

    let participants = if query.with_profiles {
        let rows: Vec<(MatchParticipant, Profile)> = match_participants::table
            .inner_join(profiles::table)
            .filter(match_participants::match_id.eq(match_info.id))
            .select((MatchParticipant::as_select(), Profile::as_select()))
            .load(&mut conn)
            .await?;

        rows.into_iter()
            .map(|(participant, profile)| ParticipantResult {
                participant,
                profile: Some(profile.into()),
            })
            .collect()
    } else {
        let rows: Vec<MatchParticipant> = match_participants::table
            .filter(match_participants::match_id.eq(match_info.id))
            .load(&mut conn)
            .await?;

        rows.into_iter()
            .map(|participant| ParticipantResult {
                participant,
                profile: None,
            })
            .collect()
    };

    Ok(Json(MatchResponse {
        match_info,
        participants,
    }))
}

/// Delete match by ID
#[utoipa::path(
    method(delete),
    path = "/{id}",
    params(
        ("id" = i32, Path, description = "ID of match to delete"),
    ),
    responses(
        (status = OK, description = "Success", content_type = "application/json"),
        (status = NOT_FOUND, description = "Match not found", body = SimpleRouteErrorOutput, content_type = "application/json"),
        (status = UNAUTHORIZED, description = "Unauthorized", body = SimpleRouteErrorOutput, content_type = "application/json"),
    ),
    security(
        ("token_jwt" = [])
    )
)]
async fn delete_match(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    claims: Claims,
) -> Result<(), RouteError> {
    use crate::schema::matches;

    if claims.profile.role != ProfileRole::Admin {
        return Err(RouteError::new_unauthorized());
    }

    let mut conn = state.db.get().await?;

    let match_info: Match = matches::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(RouteError::new_not_found)?;
    match_info.delete(&mut conn).await?;

    invalidate_views(&state.redis, match_info.event_id).await;

    Ok(())
}

#[serde_inline_default]
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct GetMatchesParams {
    #[validate(range(min = 1))]
    #[serde_inline_default(1)]
    page: i64,
    #[validate(range(min = 1, max = 50))]
    #[serde_inline_default(10)]
    page_size: i64,
    time_sort: Option<SortType>,
    game_type: Option<GameType>,
    event_id: Option<i32>,
    profile_id: Option<i32>,
}

#[derive(Serialize, ToSchema)]
struct MatchSearchResponse {
    results: Vec<Match>,
    total: i64,
}

/// Search for matches
#[utoipa::path(
    method(get),
    path = "/",
    params(
        ("page" = Option<i64>, Query, description = "Page number", minimum = 1),
        ("pageSize" = Option<i64>, Query, description = "Page size", minimum = 1, maximum = 50),
        ("timeSort" = Option<SortType>, Query, description = "Sort by creation time"),
        ("gameType" = Option<GameType>, Query, description = "Game type to filter by"),
        ("eventId" = Option<i32>, Query, description = "Event ID to filter by"),
        ("profileId" = Option<i32>, Query, description = "Only matches this profile took part in"),
    ),
    responses(
        (status = OK, description = "Success", body = MatchSearchResponse, content_type = "application/json"),
        (status = BAD_REQUEST, description = "Invalid parameters", body = SimpleRouteErrorOutput, content_type = "application/json")
    )
)]
async fn get_matches(
    State(state): State<AppState>,
    query: Query<GetMatchesParams>,
) -> Result<Json<MatchSearchResponse>, RouteError> {
    use crate::schema::{match_participants, matches};

    query
        .validate()
        .http_error("Invalid parameters", axum::http::StatusCode::BAD_REQUEST)?;

    let mut conn = state.db.get().await?;

    let mut db_query = matches::table.into_boxed();
    if let Some(game_type) = query.game_type {
        db_query = db_query.filter(matches::game_type.eq(game_type));
    }
    if let Some(event_id) = query.event_id {
        db_query = db_query.filter(matches::event_id.eq(event_id));
    }
    if let Some(profile_id) = query.profile_id {
        db_query = db_query.filter(
            matches::id.eq_any(
                match_participants::table
                    .filter(match_participants::profile_id.eq(profile_id))
                    .select(match_participants::match_id),
            ),
        );
    }

    match query.time_sort.as_ref().unwrap_or(&SortType::Desc) {
        SortType::Asc => db_query = db_query.order(matches::created_at.asc()),
        SortType::Desc => db_query = db_query.order(matches::created_at.desc()),
    }
    db_query = db_query
        .offset((query.page - 1) * query.page_size)
        .limit(query.page_size);

    let mut total_count_query = matches::table.into_boxed();
    if let Some(game_type) = query.game_type {
        total_count_query = total_count_query.filter(matches::game_type.eq(game_type));
    }
    if let Some(event_id) = query.event_id {
        total_count_query = total_count_query.filter(matches::event_id.eq(event_id));
    }
    if let Some(profile_id) = query.profile_id {
        total_count_query = total_count_query.filter(
            matches::id.eq_any(
                match_participants::table
                    .filter(match_participants::profile_id.eq(profile_id))
                    .select(match_participants::match_id),
            ),
        );
    }
    let total: i64 = total_count_query.count().get_result(&mut conn).await?;

    let results: Vec<Match> = db_query.load(&mut conn).await?;

    Ok(Json(MatchSearchResponse { results, total }))
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RecordMatchResponse {
    #[serde(flatten)]
    match_info: Match,
    participants: Vec<MatchParticipant>,
    /// Badges the winners newly earned with this match.
    awarded_badges: Vec<Badge>,
}

/// Record a completed casual match
///
/// Persists the match with one participant row per profile and evaluates
/// badge rules for every winner.
#[utoipa::path(
    method(post),
    path = "/",
    request_body = MatchSubmission,
    responses(
        (status = OK, description = "Success", body = RecordMatchResponse, content_type = "application/json"),
        (status = BAD_REQUEST, description = "Invalid submission", body = SimpleRouteErrorOutput, content_type = "application/json"),
        (status = UNAUTHORIZED, description = "Unauthorized", body = SimpleRouteErrorOutput, content_type = "application/json"),
    ),
    security(
        ("token_jwt" = [])
    )
)]
async fn record_match(
    State(state): State<AppState>,
    _claims: Claims,
    Json(submission): Json<MatchSubmission>,
) -> Result<Json<RecordMatchResponse>, RouteError> {
    let mut conn = state.db.get().await?;

    match record_casual_match(&submission, &mut conn, &state.redis).await {
        Ok(report) => Ok(Json(RecordMatchResponse {
            match_info: report.recorded,
            participants: report.participants,
            awarded_badges: report.awarded_badges,
        })),
        Err(RecordError::Database(err)) => Err(err.into()),
        Err(err) => Err(RouteError::new_bad_request().set_public_error_message(&err.to_string())),
    }
}
