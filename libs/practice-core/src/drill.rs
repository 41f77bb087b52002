//! Single-pass drill over a deck.
//!
//! Each item is asked once. The learner types an answer, sees the
//! accepted answer, then moves on. The score is the share of correct
//! answers.

use crate::deck::DeckItem;
use crate::error::{PracticeError, Result};
use crate::matching::matches;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Drill session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillState {
    /// The deck had nothing to practice.
    Empty,
    Active { index: usize, revealed: bool },
    Finished,
}

impl DrillState {
    fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Active { revealed: false, .. } => "awaiting an answer",
            Self::Active { revealed: true, .. } => "showing the answer",
            Self::Finished => "finished",
        }
    }
}

/// Running score of a drill session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillStats {
    pub correct: u32,
    pub total: u32,
}

impl DrillStats {
    /// Rounded percentage of correct answers; 0 before any answer.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (100.0 * f64::from(self.correct) / f64::from(self.total)).round() as u32
    }
}

/// Outcome of one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub correct: bool,
    /// The accepted answer, shown whether or not the response matched.
    pub answer: String,
}

/// A single-pass drill session.
#[derive(Debug)]
pub struct DrillSession<'q> {
    deck: Vec<DeckItem<'q>>,
    shuffle: bool,
    state: DrillState,
    stats: DrillStats,
}

impl<'q> DrillSession<'q> {
    /// Start a drill over a built deck.
    ///
    /// `shuffle` records whether the deck was shuffled, so a restart
    /// shuffles it again.
    pub fn new(deck: Vec<DeckItem<'q>>, shuffle: bool) -> Self {
        let state = Self::initial_state(&deck);
        tracing::debug!(items = deck.len(), "drill session started");
        Self {
            deck,
            shuffle,
            state,
            stats: DrillStats::default(),
        }
    }

    fn initial_state(deck: &[DeckItem<'q>]) -> DrillState {
        if deck.is_empty() {
            DrillState::Empty
        } else {
            DrillState::Active {
                index: 0,
                revealed: false,
            }
        }
    }

    pub fn state(&self) -> DrillState {
        self.state
    }

    pub fn stats(&self) -> DrillStats {
        self.stats
    }

    pub fn percentage(&self) -> u32 {
        self.stats.percentage()
    }

    pub fn len(&self) -> usize {
        self.deck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deck.is_empty()
    }

    pub fn deck(&self) -> &[DeckItem<'q>] {
        &self.deck
    }

    /// The item being asked, if the session is active.
    pub fn current(&self) -> Option<&DeckItem<'q>> {
        match self.state {
            DrillState::Active { index, .. } => self.deck.get(index),
            _ => None,
        }
    }

    /// 1-based number of the item being asked.
    pub fn position(&self) -> Option<usize> {
        match self.state {
            DrillState::Active { index, .. } => Some(index + 1),
            _ => None,
        }
    }

    /// Check a typed answer against the current item and reveal it.
    pub fn submit_answer(&mut self, text: &str) -> Result<AnswerFeedback> {
        let index = match self.state {
            DrillState::Active {
                index,
                revealed: false,
            } => index,
            state => return Err(invalid("submit an answer", state)),
        };
        let item = &self.deck[index];

        let correct = matches(text, &item.answer);
        self.stats.total += 1;
        if correct {
            self.stats.correct += 1;
        }
        self.state = DrillState::Active {
            index,
            revealed: true,
        };

        tracing::debug!(item = %item.id, correct, "drill answer checked");
        Ok(AnswerFeedback {
            correct,
            answer: item.answer.clone(),
        })
    }

    /// Move past a revealed item.
    pub fn advance(&mut self) -> Result<DrillState> {
        let index = match self.state {
            DrillState::Active {
                index,
                revealed: true,
            } => index,
            state => return Err(invalid("advance", state)),
        };

        self.state = if index + 1 < self.deck.len() {
            DrillState::Active {
                index: index + 1,
                revealed: false,
            }
        } else {
            tracing::debug!(
                correct = self.stats.correct,
                total = self.stats.total,
                "drill session finished"
            );
            DrillState::Finished
        };
        Ok(self.state)
    }

    /// Start over from the first item with a fresh score.
    pub fn restart(&mut self) {
        self.restart_with_rng(&mut rand::rng());
    }

    /// Start over, reshuffling with the given rng when shuffle is on.
    pub fn restart_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.shuffle {
            self.deck.shuffle(rng);
        }
        self.stats = DrillStats::default();
        self.state = Self::initial_state(&self.deck);
    }
}

fn invalid(action: &'static str, state: DrillState) -> PracticeError {
    tracing::error!(action, state = state.name(), "invalid drill transition");
    PracticeError::InvalidTransition {
        action,
        state: state.name(),
    }
}
