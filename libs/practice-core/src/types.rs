//! Core types for vocabulary practice.

use crate::error::PracticeError;
use crate::import::ProcessingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which entities a practice session draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeMode {
    Words,
    Variants,
    Sentences,
}

impl Default for PracticeMode {
    fn default() -> Self {
        Self::Words
    }
}

/// Which side of an entity is shown as the prompt.
///
/// Forward prompts with the source-language term and expects the
/// target-language term; reverse swaps them for every entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Reverse,
}

impl Default for Direction {
    fn default() -> Self {
        Self::Forward
    }
}

impl Direction {
    /// Get the direction name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }

    /// Order a (source, target) pair into (question, answer).
    pub fn orient<'a>(&self, source: &'a str, target: &'a str) -> (&'a str, &'a str) {
        match self {
            Self::Forward => (source, target),
            Self::Reverse => (target, source),
        }
    }
}

/// Practice configuration, fixed for the lifetime of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeSettings {
    pub mode: PracticeMode,
    pub direction: Direction,
    pub shuffle: bool,
    pub show_hints: bool,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            mode: PracticeMode::default(),
            direction: Direction::default(),
            shuffle: false,
            show_hints: true,
        }
    }
}

/// An inflected or derived form of a word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantEntity {
    pub id: i64,
    pub value: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// A vocabulary word with its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntity {
    pub id: i64,
    pub lemma: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub variants: Vec<VariantEntity>,
}

impl WordEntity {
    /// Create a word with no variants or extra detail.
    pub fn new(id: i64, lemma: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            id,
            lemma: lemma.into(),
            translation: translation.into(),
            example_sentence: None,
            explanation: None,
            properties: BTreeMap::new(),
            variants: Vec::new(),
        }
    }
}

/// A sentence with its translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceEntity {
    pub id: i64,
    pub text: String,
    pub translation: String,
}

impl SentenceEntity {
    pub fn new(id: i64, text: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            translation: translation.into(),
        }
    }
}

/// A quiz and the entities it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub words: Vec<WordEntity>,
    #[serde(default)]
    pub sentences: Vec<SentenceEntity>,
    #[serde(default)]
    pub processing_status: ProcessingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_message: Option<String>,
}

impl Quiz {
    /// Create an empty, fully processed quiz.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            words: Vec::new(),
            sentences: Vec::new(),
            processing_status: ProcessingStatus::Completed,
            processing_message: None,
        }
    }
}

/// Borrowed view of the entity a deck item was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef<'q> {
    Word(&'q WordEntity),
    Variant {
        word: &'q WordEntity,
        variant: &'q VariantEntity,
    },
    Sentence(&'q SentenceEntity),
}

/// Which words and sentences of a quiz take part in practice.
///
/// Words and sentences have separate id spaces. Variants are never selected
/// on their own; they follow their word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub words: BTreeSet<i64>,
    pub sentences: BTreeSet<i64>,
}

impl Selection {
    /// Select every word and sentence of the quiz.
    pub fn all(quiz: &Quiz) -> Self {
        Self {
            words: quiz.words.iter().map(|w| w.id).collect(),
            sentences: quiz.sentences.iter().map(|s| s.id).collect(),
        }
    }

    pub fn contains_word(&self, id: i64) -> bool {
        self.words.contains(&id)
    }

    pub fn contains_sentence(&self, id: i64) -> bool {
        self.sentences.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.sentences.is_empty()
    }
}

/// Rating for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Whether this rating sends the card back into the session queue.
    pub fn requeues(self) -> bool {
        self == Self::Again
    }
}

impl TryFrom<u8> for Rating {
    type Error = PracticeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or(PracticeError::InvalidRating(value))
    }
}

/// Kind of entity a review card stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Word,
    Sentence,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Sentence => "sentence",
        }
    }

    /// Review mode name for this card type ("words" or "sentences").
    pub fn mode_str(&self) -> &'static str {
        match self {
            Self::Word => "words",
            Self::Sentence => "sentences",
        }
    }
}

/// Content of a review card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardSubject {
    Word {
        lemma: String,
        translation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        example_sentence: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
    },
    Sentence {
        text: String,
        translation: String,
    },
}

/// Identifies a card to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardKey {
    pub id: i64,
    pub card_type: CardType,
}

/// A reviewable card with the scheduling metadata supplied by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewCard {
    pub id: i64,
    #[serde(flatten)]
    pub subject: CardSubject,
    pub is_new: bool,
    pub interval_days: f64,
    pub ease_factor: f64,
    #[serde(default)]
    pub repetitions: u32,
    pub due_date: DateTime<Utc>,
}

impl ReviewCard {
    pub fn card_type(&self) -> CardType {
        match self.subject {
            CardSubject::Word { .. } => CardType::Word,
            CardSubject::Sentence { .. } => CardType::Sentence,
        }
    }

    pub fn key(&self) -> CardKey {
        CardKey {
            id: self.id,
            card_type: self.card_type(),
        }
    }

    /// Question and answer for this card in the given direction.
    pub fn prompt(&self, direction: Direction) -> Prompt {
        let (source, target) = match &self.subject {
            CardSubject::Word {
                lemma, translation, ..
            } => (lemma.as_str(), translation.as_str()),
            CardSubject::Sentence { text, translation } => (text.as_str(), translation.as_str()),
        };
        let (question, answer) = direction.orient(source, target);
        Prompt {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }
}

/// A question/answer pair ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub question: String,
    pub answer: String,
}
