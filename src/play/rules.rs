use diesel_async::AsyncPgConnection;
use tracing::warn;

use crate::{
    models::{
        badges::{Badge, NewProfileBadge},
        decks::Deck,
        matches::MatchParticipant,
    },
    util::game_types::MatchResult,
};

pub const FIRST_BLOOD_SLUG: &str = "first-blood";
pub const HOT_HAND_SLUG: &str = "hot-hand";
pub const COMMANDER_ACE_SLUG: &str = "commander-ace";

/// How many recent participant rows a standard evaluation looks at.
const HISTORY_LOOKBACK: i64 = 50;

const DEFAULT_STREAK_TARGET: i64 = 3;

/// Length of the unbroken run of wins at the front of a newest-first
/// result history. Anything that isn't a reported win breaks the run.
fn leading_win_streak(results: &[Option<MatchResult>]) -> usize {
    results
        .iter()
        .take_while(|result| **result == Some(MatchResult::Win))
        .count()
}

fn qualifies_first_blood(results: &[Option<MatchResult>]) -> bool {
    results
        .iter()
        .any(|result| *result == Some(MatchResult::Win))
}

fn qualifies_hot_hand(results: &[Option<MatchResult>], target: usize) -> bool {
    leading_win_streak(results) >= target
}

/// Streak threshold from a badge's rule parameters.
fn streak_target(badge: &Badge) -> usize {
    usize::try_from(
        badge
            .metadata
            .get("streak")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(DEFAULT_STREAK_TARGET),
    )
    .unwrap_or(DEFAULT_STREAK_TARGET as usize)
}

/// Awards `badge` to the profile unless it already holds it in this scope.
/// Returns the catalog entry only when the award is new.
async fn try_award(
    badge: Badge,
    profile_id: i32,
    event_id: Option<i32>,
    conn: &mut AsyncPgConnection,
) -> anyhow::Result<Option<Badge>> {
    let newly_awarded = NewProfileBadge::new(profile_id, badge.id, event_id)
        .award_once(conn)
        .await?;

    Ok(newly_awarded.map(|_| badge))
}

/// Looks up a rule's catalog entry. A missing entry disables the rule
/// rather than failing evaluation, since the catalog is authored
/// out-of-band.
async fn rule_badge(slug: &str, conn: &mut AsyncPgConnection) -> anyhow::Result<Option<Badge>> {
    let badge = Badge::find_by_slug(slug, conn).await?;
    if badge.is_none() {
        warn!("Badge catalog has no entry for rule {slug}, skipping");
    }
    Ok(badge)
}

/// Runs the standard badge rules against a profile's recent match history
/// and awards whatever is newly met. Scoped to an event when one is given:
/// only matches of that event count, and the award carries the event.
///
/// Idempotent per invocation context: with unchanged history a second call
/// finds every qualifying badge already awarded and returns nothing.
///
/// # Errors
/// This fails if reading the history or writing an award fails. The caller
/// decides how to isolate such failures (see `play::record`).
pub async fn evaluate_standard_badges(
    profile_id: i32,
    event_id: Option<i32>,
    conn: &mut AsyncPgConnection,
) -> anyhow::Result<Vec<Badge>> {
    let history =
        MatchParticipant::recent_for_profile(profile_id, event_id, HISTORY_LOOKBACK, conn).await?;
    let results: Vec<Option<MatchResult>> = history
        .iter()
        .map(|(participant, _)| participant.result)
        .collect();

    let mut newly_awarded = Vec::new();

    if qualifies_first_blood(&results) {
        if let Some(badge) = rule_badge(FIRST_BLOOD_SLUG, conn).await? {
            newly_awarded.extend(try_award(badge, profile_id, event_id, conn).await?);
        }
    }

    if let Some(badge) = rule_badge(HOT_HAND_SLUG, conn).await? {
        if qualifies_hot_hand(&results, streak_target(&badge)) {
            newly_awarded.extend(try_award(badge, profile_id, event_id, conn).await?);
        }
    }

    Ok(newly_awarded)
}

/// Checks the commander-specific rule for a winner that reported a deck:
/// the first win piloting a deck with a commander earns the badge. Returns
/// the badge only when it was newly awarded.
///
/// # Errors
/// This fails if reading the deck or match history, or writing the award,
/// fails.
pub async fn evaluate_commander_badge(
    profile_id: i32,
    deck_id: i32,
    event_id: Option<i32>,
    conn: &mut AsyncPgConnection,
) -> anyhow::Result<Option<Badge>> {
    use diesel::prelude::*;
    use diesel_async::RunQueryDsl;

    use crate::schema::decks;

    let deck = decks::table
        .find(deck_id)
        .first::<Deck>(conn)
        .await
        .optional()?;

    // The deck has to belong to the winner and actually have a commander.
    let Some(deck) = deck else {
        return Ok(None);
    };
    if deck.profile_id != profile_id || deck.commander.is_none() {
        return Ok(None);
    }

    let wins = MatchParticipant::count_wins_with_deck(profile_id, deck_id, conn).await?;
    if wins < 1 {
        return Ok(None);
    }

    match rule_badge(COMMANDER_ACE_SLUG, conn).await? {
        Some(badge) => try_award(badge, profile_id, event_id, conn).await,
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: Option<MatchResult> = Some(MatchResult::Win);
    const L: Option<MatchResult> = Some(MatchResult::Loss);
    const D: Option<MatchResult> = Some(MatchResult::Draw);

    #[test]
    fn test_streak_counts_leading_wins_only() {
        assert_eq!(leading_win_streak(&[W, W, L, W]), 2);
        assert_eq!(leading_win_streak(&[L, W, W]), 0);
        assert_eq!(leading_win_streak(&[]), 0);
    }

    #[test]
    fn test_streak_broken_by_draw_and_unreported() {
        assert_eq!(leading_win_streak(&[W, D, W]), 1);
        assert_eq!(leading_win_streak(&[W, None, W]), 1);
    }

    #[test]
    fn test_hot_hand_met_on_third_win() {
        assert!(!qualifies_hot_hand(&[W, W, L], 3));
        assert!(qualifies_hot_hand(&[W, W, W, L], 3));
        // a longer streak still matches; once-ness comes from the award
        // uniqueness, not the rule
        assert!(qualifies_hot_hand(&[W, W, W, W], 3));
    }

    #[test]
    fn test_first_blood_needs_any_win() {
        assert!(!qualifies_first_blood(&[L, D, None]));
        assert!(qualifies_first_blood(&[L, W]));
    }

    #[test]
    fn test_streak_target_from_metadata() {
        let badge = |metadata: serde_json::Value| Badge {
            id: 1,
            slug: HOT_HAND_SLUG.to_owned(),
            name: "Hot Hand".to_owned(),
            description: String::new(),
            icon_url: String::new(),
            metadata,
        };

        assert_eq!(streak_target(&badge(serde_json::json!({"streak": 5}))), 5);
        assert_eq!(streak_target(&badge(serde_json::json!({}))), 3);
        assert_eq!(streak_target(&badge(serde_json::json!({"streak": "x"}))), 3);
    }
}
