//! Interface to the external spaced-repetition scheduler.
//!
//! The scheduler owns interval and ease-factor arithmetic and the persisted
//! schedule. Review sessions only fetch cards from it and report ratings.

use crate::error::ServiceError;
use crate::types::{CardKey, CardType, Direction, Rating, ReviewCard};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a review session covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewScope {
    pub quiz_id: i64,
    pub card_type: CardType,
    pub direction: Direction,
    /// Restrict word reviews to these words. `None` means every word.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_ids: Option<Vec<i64>>,
}

impl ReviewScope {
    pub fn new(quiz_id: i64, card_type: CardType, direction: Direction) -> Self {
        Self {
            quiz_id,
            card_type,
            direction,
            word_ids: None,
        }
    }

    /// Limit a word review to the given words. Ignored for sentences.
    pub fn with_word_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        if self.card_type == CardType::Word {
            self.word_ids = Some(ids.into_iter().collect());
        }
        self
    }

    /// A word review whose filter names no words. Such a scope has no
    /// cards; it must not be sent as an unfiltered fetch.
    pub fn excludes_all_words(&self) -> bool {
        self.card_type == CardType::Word && matches!(&self.word_ids, Some(ids) if ids.is_empty())
    }
}

/// Cards the scheduler considers reviewable now.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardBatch {
    /// Previously reviewed cards whose due date has passed.
    pub due_cards: Vec<ReviewCard>,
    /// Cards never reviewed in this direction.
    pub new_cards: Vec<ReviewCard>,
    pub total_due: usize,
    pub total_new: usize,
}

impl CardBatch {
    pub fn new(due_cards: Vec<ReviewCard>, new_cards: Vec<ReviewCard>) -> Self {
        Self {
            total_due: due_cards.len(),
            total_new: new_cards.len(),
            due_cards,
            new_cards,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.due_cards.is_empty() && self.new_cards.is_empty()
    }
}

/// Schedule the scheduler assigned after a rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingOutcome {
    pub interval_days: f64,
    pub ease_factor: f64,
    pub repetitions: u32,
    pub due_date: DateTime<Utc>,
}

/// Due and new counts for one quiz that has due cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDue {
    pub id: i64,
    pub name: String,
    pub due_words: usize,
    pub due_sentences: usize,
    pub new_words: usize,
    pub new_sentences: usize,
}

/// Review counts across every quiz, in the forward direction.
///
/// Quizzes with review tracking disabled are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewOverview {
    pub total_due_words: usize,
    pub total_new_words: usize,
    pub total_due_sentences: usize,
    pub total_new_sentences: usize,
    pub total_due: usize,
    pub total_new: usize,
    /// Only quizzes with at least one due word or sentence.
    pub quizzes_with_due: Vec<QuizDue>,
}

impl ReviewOverview {
    pub fn has_due(&self) -> bool {
        self.total_due > 0
    }
}

/// Remote spaced-repetition scheduler.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Due and new cards for the scope.
    async fn fetch_cards(&self, scope: &ReviewScope) -> Result<CardBatch, ServiceError>;

    /// Record a rating and return the card's new schedule.
    async fn rate(
        &self,
        card: CardKey,
        rating: Rating,
        direction: Direction,
    ) -> Result<RatingOutcome, ServiceError>;

    /// Wipe persisted progress for every card in the scope.
    async fn reset_progress(&self, scope: &ReviewScope) -> Result<(), ServiceError>;

    /// Due and new counts across every quiz.
    async fn overview(&self) -> Result<ReviewOverview, ServiceError>;
}
