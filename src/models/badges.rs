use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{events::Event, profiles::Profile},
    schema::{badges, profile_badges},
};

/// Static achievement catalog entry. Authored through the manager CLI,
/// read-only for the server itself.
#[derive(Identifiable, Selectable, Queryable, Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[diesel(table_name = badges, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub icon_url: String,
    /// Rule parameters, e.g. `{"streak": 3}` for win-streak badges.
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

impl Badge {
    /// Retrieves a catalog entry by its slug.
    ///
    /// # Errors
    /// This fails if the database query fails.
    pub async fn find_by_slug(
        find_slug: &str,
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Option<Self>> {
        use crate::schema::badges::dsl::*;

        badges
            .filter(slug.eq(find_slug))
            .first::<Self>(conn)
            .await
            .optional()
    }
}

/// An awarded badge. The table carries a uniqueness constraint over
/// (profile, badge, event) with nulls not distinct, so a badge can be
/// awarded at most once per scope no matter how often evaluation runs.
#[derive(Identifiable, Selectable, Queryable, Associations, Debug, Serialize, ToSchema)]
#[diesel(belongs_to(Profile))]
#[diesel(belongs_to(Badge))]
#[diesel(belongs_to(Event))]
#[diesel(table_name = profile_badges, check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct ProfileBadge {
    pub id: i32,
    pub profile_id: i32,
    pub badge_id: i32,
    pub event_id: Option<i32>,
    #[serde(serialize_with = "time::serde::iso8601::serialize")]
    #[schema(value_type = String)]
    pub awarded_at: time::OffsetDateTime,
}

/// An award joined with its catalog entry, for display.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBadgeView {
    #[serde(flatten)]
    pub badge: Badge,
    pub event_id: Option<i32>,
    #[serde(serialize_with = "time::serde::iso8601::serialize")]
    #[schema(value_type = String)]
    pub awarded_at: time::OffsetDateTime,
}

impl ProfileBadge {
    /// Retrieves all of a profile's awards with their catalog entries,
    /// newest first.
    ///
    /// # Errors
    /// This fails if the database query fails.
    pub async fn views_for_profile(
        find_profile_id: i32,
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<ProfileBadgeView>> {
        use crate::schema::profile_badges::dsl::*;

        Ok(profile_badges
            .inner_join(badges::table)
            .filter(profile_id.eq(find_profile_id))
            .order(awarded_at.desc())
            .select((Self::as_select(), Badge::as_select()))
            .load::<(Self, Badge)>(conn)
            .await?
            .into_iter()
            .map(|(award, badge)| ProfileBadgeView {
                badge,
                event_id: award.event_id,
                awarded_at: award.awarded_at,
            })
            .collect())
    }
}

#[derive(Insertable)]
#[diesel(table_name = profile_badges)]
pub struct NewProfileBadge {
    pub profile_id: i32,
    pub badge_id: i32,
    pub event_id: Option<i32>,
}

impl NewProfileBadge {
    #[must_use]
    pub const fn new(profile_id: i32, badge_id: i32, event_id: Option<i32>) -> Self {
        Self {
            profile_id,
            badge_id,
            event_id,
        }
    }

    /// Awards the badge if it hasn't been awarded in this scope yet.
    ///
    /// A single conditional insert: when the award already exists the
    /// conflict is swallowed by the database and `None` comes back, so
    /// concurrent evaluations cannot double-award.
    ///
    /// # Errors
    /// This fails if the insert fails for any reason other than the
    /// uniqueness conflict.
    pub async fn award_once(
        &self,
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Option<ProfileBadge>> {
        diesel::insert_into(profile_badges::table)
            .values(self)
            .on_conflict_do_nothing()
            .get_result::<ProfileBadge>(conn)
            .await
            .optional()
    }
}
