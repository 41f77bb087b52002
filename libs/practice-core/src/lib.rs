//! Core vocabulary practice library shared by practice front ends.
//!
//! Provides:
//! - Answer matching for typed answers
//! - Deck construction from quiz words, variants and sentences
//! - Single-pass drill sessions
//! - Spaced-repetition review sessions driven by an external scheduler
//! - Import processing status and the practice store

pub mod deck;
pub mod drill;
pub mod error;
pub mod import;
pub mod matching;
pub mod review;
pub mod scheduler;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

pub use deck::{build, build_with_rng, DeckItem};
pub use drill::{AnswerFeedback, DrillSession, DrillState, DrillStats};
pub use error::{PracticeError, Result, ServiceError};
pub use import::{ImportProgress, ImportSource, ProcessingStatus};
pub use matching::{accepted_answers, matches};
pub use review::{CardTotals, ReviewSession, ReviewState, ReviewStats};
pub use scheduler::{
    CardBatch, QuizDue, RatingOutcome, ReviewOverview, ReviewScope, Scheduler,
};
pub use store::PracticeStore;
pub use types::{
    CardKey, CardSubject, CardType, Direction, EntityRef, PracticeMode, PracticeSettings, Prompt,
    Quiz, Rating, ReviewCard, Selection, SentenceEntity, VariantEntity, WordEntity,
};
