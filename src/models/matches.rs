use diesel::{
    backend::Backend,
    deserialize::{self, FromSql},
    pg::Pg,
    prelude::*,
    serialize::{self, Output, ToSql},
    sql_types::SmallInt,
};
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{decks::Deck, events::Event, profiles::Profile},
    schema::{match_participants, matches},
    util::game_types::{GameType, MatchResult},
};

impl ToSql<SmallInt, Pg> for GameType
where
    i16: ToSql<SmallInt, Pg>,
{
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let v = *self as i16;
        <i16 as ToSql<SmallInt, Pg>>::to_sql(&v, &mut out.reborrow())
    }
}

impl<DB> FromSql<SmallInt, DB> for GameType
where
    DB: Backend,
    i16: FromSql<SmallInt, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        let type_num = i16::from_sql(bytes)?;
        Ok(Self::try_from(type_num)?)
    }
}

impl ToSql<SmallInt, Pg> for MatchResult
where
    i16: ToSql<SmallInt, Pg>,
{
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let v = *self as i16;
        <i16 as ToSql<SmallInt, Pg>>::to_sql(&v, &mut out.reborrow())
    }
}

impl<DB> FromSql<SmallInt, DB> for MatchResult
where
    DB: Backend,
    i16: FromSql<SmallInt, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        let result_num = i16::from_sql(bytes)?;
        Ok(Self::try_from(result_num)?)
    }
}

/// One logged game. Rows are historical facts and are never mutated after
/// creation; the only write path besides insertion is admin deletion.
#[derive(
    Identifiable, Selectable, Queryable, Associations, Debug, Clone, Serialize, ToSchema,
)]
#[diesel(belongs_to(Event))]
#[diesel(table_name = matches, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: i32,
    pub event_id: Option<i32>,
    /// Bracket round, null for casual play.
    pub round: Option<i32>,
    pub game_type: GameType,
    #[serde(serialize_with = "time::serde::iso8601::serialize")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
}

impl Match {
    /// Deletes the match and its participant rows.
    ///
    /// # Errors
    /// This fails if the database query fails.
    pub async fn delete(&self, conn: &mut AsyncPgConnection) -> anyhow::Result<()> {
        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(
                    match_participants::table.filter(match_participants::match_id.eq(self.id)),
                )
                .execute(conn)
                .await?;

                diesel::delete(matches::table.filter(matches::id.eq(self.id)))
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        Ok(())
    }
}

/// A profile's recorded involvement and outcome in one match.
#[derive(
    Identifiable, Selectable, Queryable, Associations, Debug, Clone, Serialize, ToSchema,
)]
#[diesel(belongs_to(Match))]
#[diesel(belongs_to(Profile))]
#[diesel(belongs_to(Deck))]
#[diesel(table_name = match_participants, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct MatchParticipant {
    pub id: i32,
    pub match_id: i32,
    pub profile_id: i32,
    pub deck_id: Option<i32>,
    /// Null until the result has been reported.
    pub result: Option<MatchResult>,
    /// Games taken within the match; 0 or 1 for casual play.
    pub games_won: i32,
}

impl MatchParticipant {
    /// Retrieves a profile's participant rows together with their matches,
    /// newest match first. Scoped to an event when one is given.
    ///
    /// # Errors
    /// This fails if the database query fails.
    pub async fn recent_for_profile(
        find_profile_id: i32,
        find_event_id: Option<i32>,
        limit: i64,
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<(Self, Match)>> {
        let mut query = match_participants::table
            .inner_join(matches::table)
            .filter(match_participants::profile_id.eq(find_profile_id))
            .into_boxed();

        if let Some(find_event_id) = find_event_id {
            query = query.filter(matches::event_id.eq(find_event_id));
        }

        query
            .order(matches::created_at.desc())
            .limit(limit)
            .select((Self::as_select(), Match::as_select()))
            .load::<(Self, Match)>(conn)
            .await
    }

    /// Counts a profile's recorded wins with a specific deck.
    ///
    /// # Errors
    /// This fails if the database query fails.
    pub async fn count_wins_with_deck(
        find_profile_id: i32,
        find_deck_id: i32,
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<i64> {
        use crate::schema::match_participants::dsl::*;

        match_participants
            .filter(profile_id.eq(find_profile_id))
            .filter(deck_id.eq(find_deck_id))
            .filter(result.eq(MatchResult::Win))
            .count()
            .get_result(conn)
            .await
    }
}

#[derive(Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub event_id: Option<i32>,
    pub round: Option<i32>,
    pub game_type: GameType,
}

impl NewMatch {
    /// Creates the match row.
    ///
    /// # Errors
    /// This fails if the insert fails.
    pub async fn create(&self, conn: &mut AsyncPgConnection) -> QueryResult<Match> {
        diesel::insert_into(matches::table)
            .values(self)
            .get_result::<Match>(conn)
            .await
    }
}

#[derive(Insertable, Debug, PartialEq, Eq)]
#[diesel(table_name = match_participants)]
pub struct NewMatchParticipant {
    pub match_id: i32,
    pub profile_id: i32,
    pub deck_id: Option<i32>,
    pub result: Option<MatchResult>,
    pub games_won: i32,
}

impl NewMatchParticipant {
    /// Inserts all participant rows of a match in one statement.
    ///
    /// # Errors
    /// This fails if the insert fails.
    pub async fn create_all(
        values: &[Self],
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<MatchParticipant>> {
        diesel::insert_into(match_participants::table)
            .values(values)
            .get_results::<MatchParticipant>(conn)
            .await
    }
}
