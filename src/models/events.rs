use diesel::{
    backend::Backend,
    deserialize::{self, FromSql},
    pg::Pg,
    prelude::*,
    serialize::{self, Output, ToSql},
    sql_types::SmallInt,
};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::profiles::Profile,
    schema::{event_members, events},
    util::game_types::MemberRole,
};

impl ToSql<SmallInt, Pg> for MemberRole
where
    i16: ToSql<SmallInt, Pg>,
{
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let v = *self as i16;
        <i16 as ToSql<SmallInt, Pg>>::to_sql(&v, &mut out.reborrow())
    }
}

impl<DB> FromSql<SmallInt, DB> for MemberRole
where
    DB: Backend,
    i16: FromSql<SmallInt, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        let role_num = i16::from_sql(bytes)?;
        Ok(Self::try_from(role_num)?)
    }
}

#[derive(Queryable, Selectable, Identifiable, PartialEq, Eq, Debug, Serialize, ToSchema)]
#[diesel(table_name = events, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "time::serde::iso8601::serialize")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
}

#[derive(
    Identifiable, Selectable, Queryable, Associations, PartialEq, Eq, Debug, Serialize, ToSchema,
)]
#[diesel(belongs_to(Event))]
#[diesel(belongs_to(Profile))]
#[diesel(table_name = event_members, check_for_backend(diesel::pg::Pg))]
#[diesel(primary_key(event_id, profile_id))]
#[serde(rename_all = "camelCase")]
pub struct EventMember {
    pub event_id: i32,
    pub profile_id: i32,
    pub role: MemberRole,
    #[serde(serialize_with = "time::serde::iso8601::serialize")]
    #[schema(value_type = String)]
    pub joined_at: time::OffsetDateTime,
}

impl EventMember {
    /// Returns the subset of `profile_ids` that is NOT a member of the event.
    ///
    /// # Errors
    /// This fails if the membership query fails.
    pub async fn missing_members(
        find_event_id: i32,
        find_profile_ids: &[i32],
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<i32>> {
        use crate::schema::event_members::dsl::*;

        let present: Vec<i32> = event_members
            .filter(event_id.eq(find_event_id))
            .filter(profile_id.eq_any(find_profile_ids))
            .select(profile_id)
            .load::<i32>(conn)
            .await?;

        Ok(find_profile_ids
            .iter()
            .copied()
            .filter(|find_id| !present.contains(find_id))
            .collect())
    }
}

#[derive(Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent<'a> {
    pub owner_id: i32,
    pub name: &'a str,
    pub description: &'a str,
}

impl<'a> NewEvent<'a> {
    #[must_use]
    pub const fn new(owner_id: i32, name: &'a str, description: &'a str) -> Self {
        Self {
            owner_id,
            name,
            description,
        }
    }

    /// Creates the event and enrolls the owner as its first member.
    ///
    /// # Errors
    /// This fails if either insert fails. The two inserts run in one
    /// transaction, so an event can never exist without its owner member.
    pub async fn create(&self, conn: &mut AsyncPgConnection) -> QueryResult<Event> {
        use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection};

        conn.transaction::<Event, diesel::result::Error, _>(|conn| {
            async move {
                let event = diesel::insert_into(events::table)
                    .values(self)
                    .get_result::<Event>(conn)
                    .await?;

                diesel::insert_into(event_members::table)
                    .values((
                        event_members::event_id.eq(event.id),
                        event_members::profile_id.eq(event.owner_id),
                        event_members::role.eq(MemberRole::Owner),
                    ))
                    .execute(conn)
                    .await?;

                Ok(event)
            }
            .scope_boxed()
        })
        .await
    }
}
