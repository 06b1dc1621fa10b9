/// Session controller: drives one engine, keeps the full choice history and
/// implements undo by rebuilding the engine and replaying the history.
///
/// The history is the only source of truth. Undo never mutates the engine
/// backwards; it throws it away and plays the remaining choices forward on a
/// fresh one, so every post-undo state is one forward play can reach.
use std::sync::Arc;

use crate::codec;
use crate::engine::{EngineSnapshot, PartialSortEngine, Step};
use crate::error::SortError;
use crate::estimate::estimate_comparisons;
use crate::mode::SortMode;
use crate::types::{Choice, ItemRegistry, Outcome, Ranking, SessionState};

pub struct SortSession {
    registry: Arc<ItemRegistry>,
    k: usize,
    /// `None` only for sessions rehydrated from a share token.
    engine: Option<PartialSortEngine>,
    history: Vec<Choice>,
    state: SessionState,
    outcome: Option<Outcome>,
}

impl SortSession {
    /// Set up a session ranking the top `k` of `registry`. Fails fast on an
    /// empty registry or `k` outside `1..=n`.
    pub fn new(registry: Arc<ItemRegistry>, k: usize) -> Result<Self, SortError> {
        let engine = PartialSortEngine::new(registry.clone(), k)?;
        Ok(SortSession {
            registry,
            k,
            engine: Some(engine),
            history: Vec::new(),
            state: SessionState::Setup,
            outcome: None,
        })
    }

    pub fn with_mode(registry: Arc<ItemRegistry>, mode: SortMode) -> Result<Self, SortError> {
        let k = mode.resolve_k(registry.len());
        SortSession::new(registry, k)
    }

    /// Rebuild a session by replaying `choices` from scratch.
    ///
    /// A history longer than the sort can consume is a caller bug: debug builds
    /// panic, release builds stop at the point the sort finished and drop the rest.
    pub fn replay(
        registry: Arc<ItemRegistry>,
        k: usize,
        choices: &[Choice],
    ) -> Result<Self, SortError> {
        let mut session = SortSession::new(registry, k)?;
        session.next(None)?;

        for (consumed, &choice) in choices.iter().enumerate() {
            if session.state == SessionState::Finished {
                let overrun = SortError::HistoryOverrun { consumed, len: choices.len() };
                debug_assert!(false, "{overrun}");
                tracing::warn!(%overrun, "ignoring surplus choices");
                break;
            }
            session.next(Some(choice))?;
        }

        tracing::debug!(k, replayed = session.history.len(), "replayed session");
        Ok(session)
    }

    /// Open a shared ranking without running the engine. Returns `None` when
    /// the token carries no usable data.
    pub fn from_token(registry: Arc<ItemRegistry>, token: &str) -> Option<Self> {
        let ranking = codec::deserialize(token, &registry);
        if ranking.is_empty() {
            return None;
        }
        let k = ranking.len().clamp(1, registry.len().max(1));
        Some(SortSession {
            registry,
            k,
            engine: None,
            history: Vec::new(),
            state: SessionState::Finished,
            outcome: Some(Outcome::Result(ranking)),
        })
    }

    /// Advance by exactly one suspension step.
    ///
    /// The first call passes `None`, which asks the first question or finishes
    /// at once for a single item. After that, `Some(choice)` answers the pending
    /// question; `None` just repeats the current outcome.
    pub fn next(&mut self, choice: Option<Choice>) -> Result<Outcome, SortError> {
        match (self.state, choice) {
            (SessionState::Setup, Some(_)) => return Err(SortError::UnexpectedChoice),
            (SessionState::Finished, Some(_)) => return Err(SortError::UnexpectedChoice),
            (SessionState::Sorting | SessionState::Finished, None) => {
                if let Some(outcome) = &self.outcome {
                    return Ok(outcome.clone());
                }
            }
            _ => {}
        }

        let engine = self.engine.as_mut().ok_or(SortError::UnexpectedChoice)?;
        let step = engine.advance(choice)?;
        if let Some(choice) = choice {
            self.history.push(choice);
        }

        let outcome = match step {
            Step::Pending { left, right } => {
                self.state = SessionState::Sorting;
                Outcome::Pending {
                    left: self.registry.get(left).clone(),
                    right: self.registry.get(right).clone(),
                }
            }
            Step::Done => {
                self.state = SessionState::Finished;
                let ranking = engine.ranking();
                tracing::debug!(
                    comparisons = self.history.len(),
                    ranked = ranking.len(),
                    "session finished"
                );
                Outcome::Result(ranking)
            }
        };

        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Drop the last choice and rebuild the engine from the remaining history.
    pub fn undo(&mut self) -> Result<Outcome, SortError> {
        if self.history.is_empty() || self.engine.is_none() {
            return Err(SortError::NothingToUndo);
        }

        let remaining = &self.history[..self.history.len() - 1];
        tracing::debug!(remaining = remaining.len(), "undo");

        let replayed = SortSession::replay(self.registry.clone(), self.k, remaining)?;
        *self = replayed;
        self.next(None)
    }

    /// Back to setup with the same items and target; history is discarded.
    pub fn restart(&mut self) -> Result<(), SortError> {
        *self = SortSession::new(self.registry.clone(), self.k)?;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn registry(&self) -> &Arc<ItemRegistry> {
        &self.registry
    }

    pub fn history(&self) -> &[Choice] {
        &self.history
    }

    /// Number of questions answered so far.
    pub fn comparisons(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.engine.is_some() && !self.history.is_empty()
    }

    /// Advisory estimate of the total number of questions.
    pub fn estimated_comparisons(&self) -> usize {
        estimate_comparisons(self.registry.len(), self.k)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn ranking(&self) -> Option<&Ranking> {
        match &self.outcome {
            Some(Outcome::Result(ranking)) => Some(ranking),
            _ => None,
        }
    }

    /// Share token for a finished session.
    pub fn share_token(&self) -> Option<String> {
        self.ranking().map(codec::serialize_ranking)
    }

    pub fn snapshot(&self) -> Option<EngineSnapshot> {
        self.engine.as_ref().map(PartialSortEngine::snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(labels: &[&str]) -> Arc<ItemRegistry> {
        Arc::new(ItemRegistry::from_entries(labels).unwrap())
    }

    fn pending_labels(outcome: &Outcome) -> (String, String) {
        match outcome {
            Outcome::Pending { left, right } => (left.label.clone(), right.label.clone()),
            Outcome::Result(_) => panic!("expected a pending comparison"),
        }
    }

    #[test]
    fn test_session_lifecycle() {
        let mut session = SortSession::new(registry(&["A", "B", "C", "D"]), 2).unwrap();
        assert_eq!(session.state(), SessionState::Setup);

        let first = session.next(None).unwrap();
        assert_eq!(pending_labels(&first), ("B".to_string(), "D".to_string()));
        assert_eq!(session.state(), SessionState::Sorting);

        for choice in [Choice::Left, Choice::Right, Choice::Tie] {
            assert!(session.next(Some(choice)).unwrap().is_pending());
        }
        let done = session.next(Some(Choice::Left)).unwrap();
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.comparisons(), 4);

        let Outcome::Result(ranking) = done else { panic!("expected a result") };
        assert_eq!(ranking.ranks, vec![1, 1]);
        assert!(session.share_token().is_some());
    }

    #[test]
    fn test_single_item_finishes_on_prime() {
        let mut session = SortSession::new(registry(&["solo"]), 1).unwrap();
        let outcome = session.next(None).unwrap();
        assert!(!outcome.is_pending());
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.undo(), Err(SortError::NothingToUndo));
    }

    #[test]
    fn test_invalid_configuration_fails_fast() {
        assert!(matches!(
            SortSession::new(registry(&["a", "b"]), 3),
            Err(SortError::InvalidTarget { k: 3, n: 2 })
        ));
    }

    #[test]
    fn test_choice_before_prime_is_rejected() {
        let mut session = SortSession::new(registry(&["a", "b"]), 1).unwrap();
        assert_eq!(session.next(Some(Choice::Left)), Err(SortError::UnexpectedChoice));
    }

    #[test]
    fn test_none_repeats_current_question() {
        let mut session = SortSession::new(registry(&["a", "b", "c"]), 3).unwrap();
        let first = session.next(None).unwrap();
        assert_eq!(session.next(None).unwrap(), first);
        assert_eq!(session.comparisons(), 0);
    }

    #[test]
    fn test_undo_matches_replay_of_prefix() {
        let reg = registry(&["a", "b", "c", "d", "e", "f", "g"]);
        let script = [
            Choice::Left,
            Choice::Right,
            Choice::Tie,
            Choice::Right,
            Choice::Left,
            Choice::Left,
        ];

        let mut session = SortSession::new(reg.clone(), 7).unwrap();
        session.next(None).unwrap();
        for &choice in &script {
            session.next(Some(choice)).unwrap();
        }

        let after_undo = session.undo().unwrap();
        let replayed = SortSession::replay(reg, 7, &script[..script.len() - 1]).unwrap();

        assert_eq!(session.history(), replayed.history());
        assert_eq!(session.snapshot(), replayed.snapshot());
        assert_eq!(Some(&after_undo), replayed.outcome());
    }

    #[test]
    fn test_undo_from_finished_returns_to_sorting() {
        let mut session = SortSession::new(registry(&["A", "B", "C", "D"]), 2).unwrap();
        session.next(None).unwrap();
        for choice in [Choice::Left, Choice::Right, Choice::Tie, Choice::Left] {
            session.next(Some(choice)).unwrap();
        }
        assert_eq!(session.state(), SessionState::Finished);

        let outcome = session.undo().unwrap();
        assert_eq!(session.state(), SessionState::Sorting);
        assert_eq!(pending_labels(&outcome), ("A".to_string(), "D".to_string()));
        assert_eq!(session.comparisons(), 3);
    }

    #[test]
    fn test_undo_to_empty_history_reasks_first_question() {
        let mut session = SortSession::new(registry(&["a", "b", "c"]), 3).unwrap();
        let first = session.next(None).unwrap();
        session.next(Some(Choice::Right)).unwrap();
        assert_eq!(session.undo().unwrap(), first);
        assert!(!session.can_undo());
        assert_eq!(session.undo(), Err(SortError::NothingToUndo));
    }

    #[test]
    fn test_failed_undo_leaves_session_untouched() {
        let reg = registry(&["a", "b", "c"]);
        let mut shared = SortSession::from_token(reg.clone(), "AAEBAg").unwrap();
        assert_eq!(shared.undo(), Err(SortError::NothingToUndo));
        assert_eq!(shared.state(), SessionState::Finished);
        assert_eq!(shared.ranking().map(|r| r.len()), Some(2));

        let mut session = SortSession::new(reg, 3).unwrap();
        session.next(None).unwrap();
        session.next(Some(Choice::Left)).unwrap();
        let before = session.snapshot();
        session.undo().unwrap();
        session.next(Some(Choice::Left)).unwrap();
        assert_eq!(session.history(), &[Choice::Left]);
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Choice history has 3 entries")]
    fn test_replay_overrun_asserts_in_debug() {
        // Two items need exactly one answer
        let _ = SortSession::replay(registry(&["a", "b"]), 2, &[Choice::Left; 3]);
    }

    #[test]
    fn test_restart_clears_history() {
        let mut session = SortSession::new(registry(&["a", "b", "c"]), 2).unwrap();
        session.next(None).unwrap();
        session.next(Some(Choice::Left)).unwrap();
        session.restart().unwrap();
        assert_eq!(session.state(), SessionState::Setup);
        assert_eq!(session.comparisons(), 0);
        assert!(session.outcome().is_none());
    }

    #[test]
    fn test_from_token_opens_finished_ranking() {
        let reg = registry(&["a", "b", "c"]);
        let mut session = SortSession::new(reg.clone(), 3).unwrap();
        session.next(None).unwrap();
        while session.state() == SessionState::Sorting {
            session.next(Some(Choice::Left)).unwrap();
        }
        let token = session.share_token().unwrap();

        let mut shared = SortSession::from_token(reg.clone(), &token).unwrap();
        assert_eq!(shared.state(), SessionState::Finished);
        assert_eq!(shared.ranking(), session.ranking());
        assert_eq!(shared.undo(), Err(SortError::NothingToUndo));

        assert!(SortSession::from_token(reg, "not base64!").is_none());
    }

    #[test]
    fn test_estimate_is_exposed() {
        let session = SortSession::with_mode(registry(&["a", "b", "c", "d"]), SortMode::Top(10)).unwrap();
        assert_eq!(session.k(), 4);
        assert_eq!(session.estimated_comparisons(), estimate_comparisons(4, 4));
    }
}
