use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{models::profiles::Profile, schema::decks};

#[derive(
    Queryable, Selectable, Identifiable, Associations, PartialEq, Eq, Debug, Serialize, ToSchema,
)]
#[diesel(belongs_to(Profile))]
#[diesel(table_name = decks, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: i32,
    pub profile_id: i32,
    pub name: String,
    /// Commander card name, for decks played in commander formats.
    pub commander: Option<String>,
    #[serde(serialize_with = "time::serde::iso8601::serialize")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
}

impl Deck {
    /// Retrieves all decks registered by a profile, newest first.
    pub async fn all_of_profile(
        owner_id: i32,
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<Self>> {
        use crate::schema::decks::dsl::*;

        decks
            .filter(profile_id.eq(owner_id))
            .order(created_at.desc())
            .load::<Self>(conn)
            .await
    }
}

#[derive(Insertable)]
#[diesel(table_name = decks)]
pub struct NewDeck<'a> {
    pub profile_id: i32,
    pub name: &'a str,
    pub commander: Option<&'a str>,
}

impl<'a> NewDeck<'a> {
    #[must_use]
    pub const fn new(profile_id: i32, name: &'a str, commander: Option<&'a str>) -> Self {
        Self {
            profile_id,
            name,
            commander,
        }
    }

    /// Registers the deck.
    ///
    /// # Errors
    /// This fails if the insert fails.
    pub async fn create(&self, conn: &mut AsyncPgConnection) -> QueryResult<Deck> {
        diesel::insert_into(decks::table)
            .values(self)
            .get_result::<Deck>(conn)
            .await
    }
}
