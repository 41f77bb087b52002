//! In-memory collaborators for unit tests.

use crate::error::ServiceError;
use crate::scheduler::{CardBatch, RatingOutcome, ReviewOverview, ReviewScope, Scheduler};
use crate::types::{CardKey, CardSubject, Direction, Rating, ReviewCard};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Mutex;

pub(crate) fn word_card(id: i64, lemma: &str, translation: &str, is_new: bool) -> ReviewCard {
    ReviewCard {
        id,
        subject: CardSubject::Word {
            lemma: lemma.to_string(),
            translation: translation.to_string(),
            example_sentence: None,
            explanation: None,
        },
        is_new,
        interval_days: if is_new { 0.0 } else { 3.0 },
        ease_factor: 2.5,
        repetitions: if is_new { 0 } else { 2 },
        due_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    }
}

pub(crate) fn sentence_card(id: i64, text: &str, translation: &str, is_new: bool) -> ReviewCard {
    ReviewCard {
        subject: CardSubject::Sentence {
            text: text.to_string(),
            translation: translation.to_string(),
        },
        ..word_card(id, "", "", is_new)
    }
}

#[derive(Default)]
struct FakeState {
    batch: CardBatch,
    calls: Vec<String>,
    ratings: Vec<(CardKey, Rating, Direction)>,
    fail_rates: bool,
    fail_fetches: bool,
}

/// Scheduler that serves a fixed batch and records every call.
#[derive(Default)]
pub(crate) struct FakeScheduler {
    state: Mutex<FakeState>,
}

impl FakeScheduler {
    pub(crate) fn with_batch(batch: CardBatch) -> Self {
        let fake = Self::default();
        fake.set_batch(batch);
        fake
    }

    pub(crate) fn set_batch(&self, batch: CardBatch) {
        self.state.lock().unwrap().batch = batch;
    }

    pub(crate) fn fail_rates(&self, fail: bool) {
        self.state.lock().unwrap().fail_rates = fail;
    }

    pub(crate) fn fail_fetches(&self, fail: bool) {
        self.state.lock().unwrap().fail_fetches = fail;
    }

    pub(crate) fn ratings(&self) -> Vec<(CardKey, Rating, Direction)> {
        self.state.lock().unwrap().ratings.clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl Scheduler for FakeScheduler {
    async fn fetch_cards(&self, _scope: &ReviewScope) -> Result<CardBatch, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("fetch".to_string());
        if state.fail_fetches {
            return Err(ServiceError::Network("connection refused".to_string()));
        }
        Ok(state.batch.clone())
    }

    async fn rate(
        &self,
        card: CardKey,
        rating: Rating,
        direction: Direction,
    ) -> Result<RatingOutcome, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("rate {} {}", card.id, rating.to_value()));
        if state.fail_rates {
            return Err(ServiceError::Backend {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        state.ratings.push((card, rating, direction));
        let interval_days = if rating == Rating::Again { 1.0 } else { 6.0 };
        Ok(RatingOutcome {
            interval_days,
            ease_factor: 2.5,
            repetitions: if rating == Rating::Again { 0 } else { 1 },
            due_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
                + Duration::days(interval_days as i64),
        })
    }

    async fn reset_progress(&self, _scope: &ReviewScope) -> Result<(), ServiceError> {
        self.state.lock().unwrap().calls.push("reset".to_string());
        Ok(())
    }

    async fn overview(&self) -> Result<ReviewOverview, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("overview".to_string());
        let batch = &state.batch;
        Ok(ReviewOverview {
            total_due: batch.total_due,
            total_new: batch.total_new,
            ..ReviewOverview::default()
        })
    }
}
