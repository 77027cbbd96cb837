use diesel::{
    backend::Backend,
    deserialize::{self, FromSql},
    pg::Pg,
    prelude::*,
    serialize::{self, Output, ToSql},
    sql_types::SmallInt,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{schema::profiles, util::game_types::ProfileRole};

impl ToSql<SmallInt, Pg> for ProfileRole
where
    i16: ToSql<SmallInt, Pg>,
{
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let v = *self as i16;
        <i16 as ToSql<SmallInt, Pg>>::to_sql(&v, &mut out.reborrow())
    }
}

impl<DB> FromSql<SmallInt, DB> for ProfileRole
where
    DB: Backend,
    i16: FromSql<SmallInt, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        let role_num = i16::from_sql(bytes)?;
        Ok(Self::try_from(role_num)?)
    }
}

#[derive(
    Queryable, Selectable, Identifiable, PartialEq, Eq, Debug, Clone, Serialize, Deserialize,
)]
#[diesel(table_name = profiles, check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub role: ProfileRole,
    pub avatar_url: String,
    pub bio: String,
    #[serde(with = "time::serde::iso8601")]
    pub joined_at: time::OffsetDateTime,
}

/// Profile data safe to show to anyone.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePublic {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub avatar_url: String,
    pub bio: String,
}

impl From<Profile> for ProfilePublic {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            bio: profile.bio,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile<'a> {
    pub username: &'a str,
    pub display_name: &'a str,
    pub avatar_url: &'a str,
}

impl<'a> NewProfile<'a> {
    #[must_use]
    pub const fn new(username: &'a str, display_name: &'a str, avatar_url: &'a str) -> Self {
        Self {
            username,
            display_name,
            avatar_url,
        }
    }

    /// Creates the profile, or refreshes display name and avatar if the
    /// username is already taken by the same identity.
    ///
    /// # Errors
    /// This fails if the insert/update fails.
    pub async fn create_or_update(
        &self,
        conn: &mut diesel_async::AsyncPgConnection,
    ) -> QueryResult<Profile> {
        diesel_async::RunQueryDsl::get_result::<Profile>(
            diesel::insert_into(profiles::table)
                .values(self)
                .on_conflict(profiles::username)
                .do_update()
                .set((
                    profiles::display_name.eq(self.display_name),
                    profiles::avatar_url.eq(self.avatar_url),
                )),
            conn,
        )
        .await
    }
}
