//! Spaced-repetition review session.
//!
//! The session walks a queue of due cards followed by new cards. Each card
//! is revealed, then rated 1-4. Ratings go to the scheduler; a card rated
//! "Again" is appended to the end of the queue so it comes back later in
//! the same session. The session ends when the queue is exhausted.
//!
//! Every transition takes `&mut self`, so transitions on one session never
//! interleave, including across the awaits on the scheduler.

use crate::error::{PracticeError, Result};
use crate::scheduler::{CardBatch, RatingOutcome, ReviewScope, Scheduler};
use crate::types::{Prompt, Rating, ReviewCard};
use serde::{Deserialize, Serialize};

/// Review session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    /// Cards have not been fetched yet.
    Loading,
    Active { position: usize, revealed: bool },
    /// Nothing was due or new.
    Empty,
    Finished,
}

impl ReviewState {
    fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Active {
                revealed: false, ..
            } => "unrevealed",
            Self::Active { revealed: true, .. } => "revealed",
            Self::Empty => "empty",
            Self::Finished => "finished",
        }
    }
}

/// Progress of a review session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub reviewed: u32,
    /// Queue slots left, counting the current card and requeued cards.
    pub remaining_estimate: usize,
}

/// Card counts reported by the scheduler for the current queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTotals {
    pub due: usize,
    pub new: usize,
}

/// A spaced-repetition review session.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    scope: ReviewScope,
    queue: Vec<ReviewCard>,
    state: ReviewState,
    reviewed: u32,
    totals: CardTotals,
}

impl ReviewSession {
    /// A session waiting for its first fetch.
    pub fn new(scope: ReviewScope) -> Self {
        Self {
            scope,
            queue: Vec::new(),
            state: ReviewState::Loading,
            reviewed: 0,
            totals: CardTotals::default(),
        }
    }

    /// A session over already fetched cards. Due cards come first.
    pub fn from_cards(
        scope: ReviewScope,
        due_cards: Vec<ReviewCard>,
        new_cards: Vec<ReviewCard>,
    ) -> Self {
        Self::from_batch(scope, CardBatch::new(due_cards, new_cards))
    }

    pub fn from_batch(scope: ReviewScope, batch: CardBatch) -> Self {
        let totals = CardTotals {
            due: batch.total_due,
            new: batch.total_new,
        };
        let mut queue = batch.due_cards;
        queue.extend(batch.new_cards);

        let state = if queue.is_empty() {
            ReviewState::Empty
        } else {
            ReviewState::Active {
                position: 0,
                revealed: false,
            }
        };
        tracing::debug!(
            quiz_id = scope.quiz_id,
            card_type = scope.card_type.as_str(),
            direction = scope.direction.as_str(),
            cards = queue.len(),
            "review session started"
        );

        Self {
            scope,
            queue,
            state,
            reviewed: 0,
            totals,
        }
    }

    pub fn scope(&self) -> &ReviewScope {
        &self.scope
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn totals(&self) -> CardTotals {
        self.totals
    }

    /// Every queue slot, including requeued cards and already reviewed ones.
    pub fn queue(&self) -> &[ReviewCard] {
        &self.queue
    }

    pub fn stats(&self) -> ReviewStats {
        let position = match self.state {
            ReviewState::Active { position, .. } => position,
            _ => self.queue.len(),
        };
        ReviewStats {
            reviewed: self.reviewed,
            remaining_estimate: self.queue.len().saturating_sub(position),
        }
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self.state, ReviewState::Active { revealed: true, .. })
    }

    /// The card being reviewed, if the session is active.
    pub fn current_card(&self) -> Option<&ReviewCard> {
        match self.state {
            ReviewState::Active { position, .. } => self.queue.get(position),
            _ => None,
        }
    }

    /// Question and answer of the current card in the session's direction.
    pub fn prompt(&self) -> Option<Prompt> {
        self.current_card()
            .map(|card| card.prompt(self.scope.direction))
    }

    /// Fetch the first queue from the scheduler.
    ///
    /// On failure the session stays in `Loading` and the call can be retried.
    pub async fn load<S>(&mut self, scheduler: &S) -> Result<ReviewState>
    where
        S: Scheduler + ?Sized,
    {
        if self.state != ReviewState::Loading {
            return Err(invalid("load", self.state));
        }
        self.refetch(scheduler).await
    }

    /// Show the answer of the current card.
    pub fn reveal(&mut self) -> Result<Prompt> {
        let position = match self.state {
            ReviewState::Active {
                position,
                revealed: false,
            } => position,
            state => return Err(invalid("reveal", state)),
        };
        self.state = ReviewState::Active {
            position,
            revealed: true,
        };
        Ok(self.queue[position].prompt(self.scope.direction))
    }

    /// Rate the revealed card.
    ///
    /// The rating is sent to the scheduler first. If that fails the session
    /// is left exactly as it was, so the same rating can be retried.
    pub async fn rate<S>(&mut self, scheduler: &S, rating: Rating) -> Result<RatingOutcome>
    where
        S: Scheduler + ?Sized,
    {
        let position = match self.state {
            ReviewState::Active {
                position,
                revealed: true,
            } => position,
            state => return Err(invalid("rate", state)),
        };
        let key = self.queue[position].key();

        let outcome = match scheduler.rate(key, rating, self.scope.direction).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(card_id = key.id, error = %e, "rating was not recorded");
                return Err(e.into());
            }
        };

        self.apply_rating(position, rating);
        tracing::debug!(
            card_id = key.id,
            rating = rating.to_value(),
            interval_days = outcome.interval_days,
            remaining = self.stats().remaining_estimate,
            "card rated"
        );
        Ok(outcome)
    }

    /// Rate the revealed card from its 1-4 numeric form.
    pub async fn rate_value<S>(&mut self, scheduler: &S, value: u8) -> Result<RatingOutcome>
    where
        S: Scheduler + ?Sized,
    {
        let rating = Rating::try_from(value)?;
        self.rate(scheduler, rating).await
    }

    fn apply_rating(&mut self, position: usize, rating: Rating) {
        self.reviewed += 1;
        if rating.requeues() {
            let card = self.queue[position].clone();
            self.queue.push(card);
        }

        // The requeue above must land before this check so that failing
        // the last card keeps the session going.
        let next = position + 1;
        self.state = if next < self.queue.len() {
            ReviewState::Active {
                position: next,
                revealed: false,
            }
        } else {
            tracing::debug!(reviewed = self.reviewed, "review session finished");
            ReviewState::Finished
        };
    }

    /// Replace the session with a fresh fetch from the scheduler.
    ///
    /// Nothing of the old queue or stats is kept. If the fetch fails the
    /// old session is left untouched.
    pub async fn reset<S>(&mut self, scheduler: &S) -> Result<ReviewState>
    where
        S: Scheduler + ?Sized,
    {
        self.refetch(scheduler).await
    }

    /// Wipe persisted progress for the scope, then fetch again.
    ///
    /// Once the wipe succeeds the old queue is stale, so a failed fetch
    /// leaves the session in `Loading`.
    pub async fn reset_all_cards<S>(&mut self, scheduler: &S) -> Result<ReviewState>
    where
        S: Scheduler + ?Sized,
    {
        scheduler.reset_progress(&self.scope).await?;
        tracing::info!(
            quiz_id = self.scope.quiz_id,
            card_type = self.scope.card_type.as_str(),
            direction = self.scope.direction.as_str(),
            "review progress reset"
        );
        *self = Self::new(self.scope.clone());
        self.refetch(scheduler).await
    }

    async fn refetch<S>(&mut self, scheduler: &S) -> Result<ReviewState>
    where
        S: Scheduler + ?Sized,
    {
        let batch = if self.scope.excludes_all_words() {
            tracing::debug!(quiz_id = self.scope.quiz_id, "no words selected for review");
            CardBatch::default()
        } else {
            scheduler.fetch_cards(&self.scope).await?
        };
        *self = Self::from_batch(self.scope.clone(), batch);
        Ok(self.state)
    }
}

fn invalid(action: &'static str, state: ReviewState) -> PracticeError {
    tracing::error!(action, state = state.name(), "invalid review transition");
    PracticeError::InvalidTransition {
        action,
        state: state.name(),
    }
}
