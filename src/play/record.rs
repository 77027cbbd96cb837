use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, AsyncPgConnection};
use fred::clients::Pool as RedisPool;
use tracing::{error, info};

use crate::{
    models::{
        badges::Badge,
        events::EventMember,
        matches::{Match, MatchParticipant, NewMatch, NewMatchParticipant},
    },
    play::{
        rules,
        submission::{MatchSubmission, SubmissionError},
    },
    util::{game_types::MatchResult, views::invalidate_views},
};

/// Everything a successful submission produced, for the caller to display.
#[derive(Debug)]
pub struct MatchReport {
    pub recorded: Match,
    pub participants: Vec<MatchParticipant>,
    /// Badges newly earned by the winners. Possibly empty.
    pub awarded_badges: Vec<Badge>,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The submission itself is inconsistent. Nothing was written.
    #[error(transparent)]
    Rejected(#[from] SubmissionError),
    /// An event-scoped submission names profiles outside the event.
    /// Nothing was written.
    #[error("Profiles {missing:?} are not members of event {event_id}")]
    NotEventMembers { event_id: i32, missing: Vec<i32> },
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

/// Folds one winner's evaluation outcome into the running award list.
/// A failure is logged and skipped, so one profile's broken evaluation
/// cannot stop the remaining winners or take the match down with it.
fn absorb_outcome(
    awarded_badges: &mut Vec<Badge>,
    winner_id: i32,
    outcome: anyhow::Result<Vec<Badge>>,
) {
    match outcome {
        Ok(badges) => awarded_badges.extend(badges),
        Err(err) => error!("Badge evaluation failed for profile {winner_id}: {err:?}"),
    }
}

/// Turns a validated submission into the participant rows of a match.
/// Winners get a win and a game in the binary games-won counter, everyone
/// else gets a loss.
fn build_participants(match_id: i32, submission: &MatchSubmission) -> Vec<NewMatchParticipant> {
    submission
        .profile_ids
        .iter()
        .map(|profile_id| {
            let won = submission.winner_ids.contains(profile_id);
            NewMatchParticipant {
                match_id,
                profile_id: *profile_id,
                deck_id: submission.deck_ids.get(profile_id).copied(),
                result: Some(if won { MatchResult::Win } else { MatchResult::Loss }),
                games_won: i32::from(won),
            }
        })
        .collect()
}

/// Records a casual (non-bracketed) match and evaluates badges for its
/// winners.
///
/// The match and all its participants are written in one transaction, so
/// a failure partway leaves nothing behind. Badge evaluation runs after
/// the commit and is isolated per winner: one profile's evaluation error
/// is logged and neither rolls back the match nor stops the remaining
/// winners. Cached views are invalidated afterwards, best-effort.
///
/// # Errors
/// See [`RecordError`]. Validation and membership failures happen before
/// any write.
pub async fn record_casual_match(
    submission: &MatchSubmission,
    conn: &mut AsyncPgConnection,
    redis: &RedisPool,
) -> Result<MatchReport, RecordError> {
    submission.validate()?;

    if let Some(event_id) = submission.event_id {
        let missing = EventMember::missing_members(event_id, &submission.profile_ids, conn).await?;
        if !missing.is_empty() {
            return Err(RecordError::NotEventMembers { event_id, missing });
        }
    }

    let (recorded, participants) = conn
        .transaction::<(Match, Vec<MatchParticipant>), diesel::result::Error, _>(|conn| {
            async move {
                let recorded = NewMatch {
                    event_id: submission.event_id,
                    round: None,
                    game_type: submission.game_type,
                }
                .create(conn)
                .await?;

                let rows = build_participants(recorded.id, submission);
                let participants = NewMatchParticipant::create_all(&rows, conn).await?;

                Ok((recorded, participants))
            }
            .scope_boxed()
        })
        .await?;

    info!(
        "Match {} recorded: {:?} with {} participant(s), {} winner(s)",
        recorded.id,
        submission.game_type,
        submission.profile_ids.len(),
        submission.winner_ids.len()
    );

    let mut awarded_badges = Vec::new();
    for winner_id in &submission.winner_ids {
        let outcome = rules::evaluate_standard_badges(*winner_id, submission.event_id, conn).await;
        absorb_outcome(&mut awarded_badges, *winner_id, outcome);

        if let Some(deck_id) = submission.deck_ids.get(winner_id) {
            let outcome =
                rules::evaluate_commander_badge(*winner_id, *deck_id, submission.event_id, conn)
                    .await
                    .map(|badge| badge.into_iter().collect());
            absorb_outcome(&mut awarded_badges, *winner_id, outcome);
        }
    }

    invalidate_views(redis, submission.event_id).await;

    Ok(MatchReport {
        recorded,
        participants,
        awarded_badges,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::util::game_types::GameType;

    #[test]
    fn test_build_participants_marks_winners_and_decks() {
        let submission = MatchSubmission {
            game_type: GameType::Commander,
            profile_ids: vec![1, 2, 3],
            deck_ids: HashMap::from([(1, 7)]),
            winner_ids: vec![1],
            event_id: None,
        };

        let rows = build_participants(42, &submission);

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            NewMatchParticipant {
                match_id: 42,
                profile_id: 1,
                deck_id: Some(7),
                result: Some(MatchResult::Win),
                games_won: 1,
            }
        );
        for row in &rows[1..] {
            assert_eq!(row.match_id, 42);
            assert_eq!(row.deck_id, None);
            assert_eq!(row.result, Some(MatchResult::Loss));
            assert_eq!(row.games_won, 0);
        }
    }

    fn badge(id: i32, slug: &str) -> Badge {
        Badge {
            id,
            slug: slug.to_owned(),
            name: slug.to_owned(),
            description: String::new(),
            icon_url: String::new(),
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn test_one_winners_failure_does_not_stop_the_rest() {
        let outcomes: Vec<(i32, anyhow::Result<Vec<Badge>>)> = vec![
            (1, Ok(vec![badge(1, "first-blood")])),
            (2, Err(anyhow::anyhow!("history query failed"))),
            (3, Ok(vec![badge(2, "hot-hand")])),
        ];

        let mut awarded = Vec::new();
        let mut visited = Vec::new();
        for (winner_id, outcome) in outcomes {
            visited.push(winner_id);
            absorb_outcome(&mut awarded, winner_id, outcome);
        }

        // every winner was evaluated and the failure only cost its own awards
        assert_eq!(visited, [1, 2, 3]);
        let slugs: Vec<&str> = awarded.iter().map(|badge| badge.slug.as_str()).collect();
        assert_eq!(slugs, ["first-blood", "hot-hand"]);
    }

    #[test]
    fn test_reevaluation_with_no_new_awards_adds_nothing() {
        let mut awarded = vec![badge(1, "first-blood")];

        // unchanged history: the conditional insert reports nothing new
        absorb_outcome(&mut awarded, 1, Ok(vec![]));

        assert_eq!(awarded.len(), 1);
    }

    #[test]
    fn test_failed_outcome_leaves_awards_untouched() {
        let mut awarded = vec![badge(1, "first-blood")];

        absorb_outcome(&mut awarded, 2, Err(anyhow::anyhow!("award insert failed")));

        assert_eq!(awarded.len(), 1);
    }

    #[test]
    fn test_build_participants_multiple_winners() {
        let submission = MatchSubmission {
            game_type: GameType::TwoHeadedGiant,
            profile_ids: vec![5, 6, 7, 8],
            deck_ids: HashMap::new(),
            winner_ids: vec![5, 6],
            event_id: None,
        };

        let rows = build_participants(1, &submission);
        let wins = rows
            .iter()
            .filter(|row| row.result == Some(MatchResult::Win))
            .count();
        assert_eq!(wins, 2);
    }
}
