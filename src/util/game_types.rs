use diesel::{deserialize::FromSqlRow, expression::AsExpression, sql_types::SmallInt};
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Formats a logged game can be played in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    AsExpression,
    FromSqlRow,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[diesel(sql_type = SmallInt)]
#[repr(i16)]
pub enum GameType {
    Commander,
    OneVsOne,
    TwoHeadedGiant,
    FreeForAll,
    Limited,
}

/// Outcome of one participant in one match.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    AsExpression,
    FromSqlRow,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[diesel(sql_type = SmallInt)]
#[repr(i16)]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

/// Role of a profile within an event.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    AsExpression,
    FromSqlRow,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[diesel(sql_type = SmallInt)]
#[repr(i16)]
pub enum MemberRole {
    Owner,
    Admin,
    Player,
    Spectator,
}

/// Site-wide account role.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    AsExpression,
    FromSqlRow,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[diesel(sql_type = SmallInt)]
#[repr(i16)]
pub enum ProfileRole {
    User,
    Admin,
}
