use std::collections::HashMap;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::util::game_types::GameType;

/// A completed casual game as reported by a player.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchSubmission {
    pub game_type: GameType,
    /// Everyone who sat at the table, including the winners.
    pub profile_ids: Vec<i32>,
    /// Deck each participant played, keyed by profile ID. Optional per
    /// participant.
    #[serde(default)]
    pub deck_ids: HashMap<i32, i32>,
    pub winner_ids: Vec<i32>,
    /// Event this game was played at, if any.
    pub event_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("A match needs at least two participants")]
    NotEnoughParticipants,
    #[error("A participant can only be listed once")]
    DuplicateParticipant(i32),
    #[error("A match needs at least one winner")]
    NoWinners,
    #[error("Winner {0} is not listed as a participant")]
    WinnerNotParticipant(i32),
    #[error("A deck was assigned to {0}, who is not a participant")]
    DeckWithoutParticipant(i32),
}

impl MatchSubmission {
    /// Checks the submission's internal consistency. Runs before anything
    /// is written; a failure here means no row was touched.
    ///
    /// # Errors
    /// See [`SubmissionError`] for everything that gets rejected.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.profile_ids.len() < 2 {
            return Err(SubmissionError::NotEnoughParticipants);
        }
        for (i, profile_id) in self.profile_ids.iter().enumerate() {
            if self.profile_ids[..i].contains(profile_id) {
                return Err(SubmissionError::DuplicateParticipant(*profile_id));
            }
        }
        if self.winner_ids.is_empty() {
            return Err(SubmissionError::NoWinners);
        }
        if let Some(winner_id) = self
            .winner_ids
            .iter()
            .find(|winner_id| !self.profile_ids.contains(winner_id))
        {
            return Err(SubmissionError::WinnerNotParticipant(*winner_id));
        }
        if let Some(profile_id) = self
            .deck_ids
            .keys()
            .find(|profile_id| !self.profile_ids.contains(profile_id))
        {
            return Err(SubmissionError::DeckWithoutParticipant(*profile_id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(profile_ids: Vec<i32>, winner_ids: Vec<i32>) -> MatchSubmission {
        MatchSubmission {
            game_type: GameType::Commander,
            profile_ids,
            deck_ids: HashMap::new(),
            winner_ids,
            event_id: None,
        }
    }

    #[test]
    fn test_rejects_single_participant() {
        let sub = submission(vec![1], vec![1]);
        assert_eq!(sub.validate(), Err(SubmissionError::NotEnoughParticipants));
    }

    #[test]
    fn test_rejects_no_winners() {
        let sub = submission(vec![1, 2], vec![]);
        assert_eq!(sub.validate(), Err(SubmissionError::NoWinners));
    }

    #[test]
    fn test_rejects_winner_outside_table() {
        let sub = submission(vec![1, 2], vec![3]);
        assert_eq!(sub.validate(), Err(SubmissionError::WinnerNotParticipant(3)));
    }

    #[test]
    fn test_rejects_duplicate_participant() {
        let sub = submission(vec![1, 2, 1], vec![2]);
        assert_eq!(sub.validate(), Err(SubmissionError::DuplicateParticipant(1)));
    }

    #[test]
    fn test_rejects_deck_of_non_participant() {
        let mut sub = submission(vec![1, 2], vec![1]);
        sub.deck_ids.insert(9, 4);
        assert_eq!(sub.validate(), Err(SubmissionError::DeckWithoutParticipant(9)));
    }

    #[test]
    fn test_accepts_multiple_winners() {
        let sub = submission(vec![1, 2, 3, 4], vec![1, 3]);
        assert_eq!(sub.validate(), Ok(()));
    }
}
