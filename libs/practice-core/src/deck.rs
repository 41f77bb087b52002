//! Deck construction from quiz entities.
//!
//! A deck is the flat, ordered list of items one drill session walks
//! through. Items borrow the entities they came from.

use crate::types::{
    Direction, EntityRef, PracticeMode, PracticeSettings, Quiz, SentenceEntity, Selection,
    VariantEntity, WordEntity,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// One drillable question.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckItem<'q> {
    /// Unique within a deck: `word-{id}`, `sentence-{id}` or
    /// `variant-{word_id}-{variant_id}`.
    pub id: String,
    pub question: String,
    /// Accepted answer; may list comma-separated alternatives.
    pub answer: String,
    pub source: EntityRef<'q>,
    pub hint: Option<String>,
}

/// Build a deck, shuffling with the thread rng when requested.
pub fn build<'q>(
    quiz: &'q Quiz,
    settings: &PracticeSettings,
    selection: &Selection,
) -> Vec<DeckItem<'q>> {
    build_with_rng(quiz, settings, selection, &mut rand::rng())
}

/// Build a deck using the given rng for the optional shuffle.
pub fn build_with_rng<'q, R: Rng + ?Sized>(
    quiz: &'q Quiz,
    settings: &PracticeSettings,
    selection: &Selection,
    rng: &mut R,
) -> Vec<DeckItem<'q>> {
    let mut items = match settings.mode {
        PracticeMode::Sentences => quiz
            .sentences
            .iter()
            .filter(|s| selection.contains_sentence(s.id))
            .map(|s| sentence_item(s, settings.direction))
            .collect(),
        PracticeMode::Words => quiz
            .words
            .iter()
            .filter(|w| selection.contains_word(w.id))
            .map(|w| word_item(w, settings))
            .collect(),
        PracticeMode::Variants => {
            let mut items = Vec::new();
            // Variants have no selection of their own.
            for word in quiz.words.iter().filter(|w| selection.contains_word(w.id)) {
                items.push(word_item(word, settings));
                items.extend(word.variants.iter().map(|v| variant_item(word, v, settings)));
            }
            items
        }
    };

    if settings.shuffle {
        items.shuffle(rng);
    }

    tracing::debug!(
        quiz_id = quiz.id,
        mode = ?settings.mode,
        items = items.len(),
        "built practice deck"
    );
    items
}

fn sentence_item(sentence: &SentenceEntity, direction: Direction) -> DeckItem<'_> {
    let (question, answer) = direction.orient(&sentence.text, &sentence.translation);
    DeckItem {
        id: format!("sentence-{}", sentence.id),
        question: question.to_string(),
        answer: answer.to_string(),
        source: EntityRef::Sentence(sentence),
        hint: None,
    }
}

fn word_item<'q>(word: &'q WordEntity, settings: &PracticeSettings) -> DeckItem<'q> {
    let (question, answer) = settings.direction.orient(&word.lemma, &word.translation);
    let hint = if settings.show_hints {
        word.example_sentence
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    DeckItem {
        id: format!("word-{}", word.id),
        question: question.to_string(),
        answer: answer.to_string(),
        source: EntityRef::Word(word),
        hint,
    }
}

fn variant_item<'q>(
    word: &'q WordEntity,
    variant: &'q VariantEntity,
    settings: &PracticeSettings,
) -> DeckItem<'q> {
    let (question, answer) = settings
        .direction
        .orient(&variant.value, &variant.translation);
    let hint = settings.show_hints.then(|| variant_hint(word, variant));

    DeckItem {
        id: format!("variant-{}-{}", word.id, variant.id),
        question: question.to_string(),
        answer: answer.to_string(),
        source: EntityRef::Variant { word, variant },
        hint,
    }
}

/// Parent lemma, plus the variant's grammatical tags when it has any.
fn variant_hint(word: &WordEntity, variant: &VariantEntity) -> String {
    if variant.tags.is_empty() {
        return word.lemma.clone();
    }
    let tags = variant
        .tags
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} ({})", word.lemma, tags)
}
