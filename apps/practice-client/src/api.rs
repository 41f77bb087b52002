//! Request and response bodies of the practice service, and their
//! conversion into core types.

use chrono::{DateTime, NaiveDateTime, Utc};
use practice_core::{
    CardBatch, CardSubject, ImportProgress, ProcessingStatus, RatingOutcome, ReviewCard,
    ServiceError,
};
use serde::{Deserialize, Serialize};

/// GET /api/quiz/{id}/anki-cards
#[derive(Debug, Deserialize)]
pub(crate) struct AnkiCardsResponse {
    pub due_cards: Vec<ApiCard>,
    pub new_cards: Vec<ApiCard>,
    #[serde(default)]
    pub total_due: Option<usize>,
    #[serde(default)]
    pub total_new: Option<usize>,
}

impl AnkiCardsResponse {
    pub fn into_batch(self) -> Result<CardBatch, ServiceError> {
        let total_due = self.total_due.unwrap_or(self.due_cards.len());
        let total_new = self.total_new.unwrap_or(self.new_cards.len());
        let due_cards = convert_cards(self.due_cards)?;
        let new_cards = convert_cards(self.new_cards)?;
        Ok(CardBatch {
            due_cards,
            new_cards,
            total_due,
            total_new,
        })
    }
}

fn convert_cards(cards: Vec<ApiCard>) -> Result<Vec<ReviewCard>, ServiceError> {
    cards.into_iter().map(ApiCard::into_review_card).collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCard {
    id: i64,
    #[serde(rename = "type")]
    card_type: String,
    #[serde(default)]
    lemma: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    translation: Option<String>,
    #[serde(default)]
    example_sentence: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    ease_factor: f64,
    interval: f64,
    #[serde(default)]
    repetitions: u32,
    due_date: String,
    is_new: bool,
}

impl ApiCard {
    pub fn into_review_card(self) -> Result<ReviewCard, ServiceError> {
        let translation = self.translation.unwrap_or_default();
        let subject = match self.card_type.as_str() {
            "word" => CardSubject::Word {
                lemma: self.lemma.ok_or_else(|| {
                    ServiceError::Parse(format!("word card {} has no lemma", self.id))
                })?,
                translation,
                example_sentence: self.example_sentence.filter(|s| !s.is_empty()),
                explanation: self.explanation.filter(|s| !s.is_empty()),
            },
            "sentence" => CardSubject::Sentence {
                text: self.text.ok_or_else(|| {
                    ServiceError::Parse(format!("sentence card {} has no text", self.id))
                })?,
                translation,
            },
            other => {
                return Err(ServiceError::Parse(format!(
                    "unknown card type {other:?} for card {}",
                    self.id
                )))
            }
        };

        Ok(ReviewCard {
            id: self.id,
            subject,
            is_new: self.is_new,
            interval_days: self.interval,
            ease_factor: self.ease_factor,
            repetitions: self.repetitions,
            due_date: parse_timestamp(&self.due_date)?,
        })
    }
}

/// POST /api/{word|sentence}/{id}/review
#[derive(Debug, Serialize)]
pub(crate) struct ReviewRequest<'a> {
    pub rating: u8,
    pub direction: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewResponse {
    ease_factor: f64,
    interval: f64,
    #[serde(default)]
    repetitions: u32,
    due_date: String,
    #[serde(default = "tracking_default")]
    pub tracking_enabled: bool,
}

fn tracking_default() -> bool {
    true
}

impl ReviewResponse {
    pub fn into_outcome(self) -> Result<RatingOutcome, ServiceError> {
        Ok(RatingOutcome {
            interval_days: self.interval,
            ease_factor: self.ease_factor,
            repetitions: self.repetitions,
            due_date: parse_timestamp(&self.due_date)?,
        })
    }
}

/// POST /api/quiz/{id}/reset-anki
#[derive(Debug, Serialize)]
pub(crate) struct ResetRequest<'a> {
    pub mode: &'a str,
    pub direction: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResetResponse {
    #[serde(default)]
    pub reset_count: usize,
}

/// GET /quiz/{id}/status
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    #[serde(default)]
    status: Option<ProcessingStatus>,
    #[serde(default)]
    message: Option<String>,
}

impl StatusResponse {
    pub fn into_progress(self) -> ImportProgress {
        ImportProgress {
            status: self.status.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
        }
    }
}

/// Error body returned by the service on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Best human-readable message from a failed response body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Parse a service timestamp. Offsetless timestamps are UTC.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| ServiceError::Parse(format!("invalid timestamp {value:?}: {e}")))
}
