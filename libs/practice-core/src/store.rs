//! Practice store: the quizzes a learner can practice, their selections,
//! and the current practice settings.
//!
//! The store is an ordinary value owned by its caller. Several stores can
//! live side by side without sharing anything.

use crate::deck::{self, DeckItem};
use crate::drill::DrillSession;
use crate::error::{PracticeError, Result};
use crate::import::ImportProgress;
use crate::scheduler::ReviewScope;
use crate::types::{CardType, PracticeSettings, Quiz, Selection};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct QuizEntry {
    quiz: Quiz,
    selection: Selection,
}

/// Quizzes, selections and settings for one learner.
#[derive(Debug, Clone, Default)]
pub struct PracticeStore {
    quizzes: BTreeMap<i64, QuizEntry>,
    selected: Option<i64>,
    settings: PracticeSettings,
}

impl PracticeStore {
    pub fn new(settings: PracticeSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Insert a quiz or replace its entities.
    ///
    /// Selection survives for entities that are still present; entities
    /// new to the store start selected.
    pub fn upsert_quiz(&mut self, quiz: Quiz) {
        let selection = match self.quizzes.get(&quiz.id) {
            Some(entry) => {
                let previous = Selection::all(&entry.quiz);
                let mut selection = Selection::all(&quiz);
                selection
                    .words
                    .retain(|id| !previous.words.contains(id) || entry.selection.words.contains(id));
                selection.sentences.retain(|id| {
                    !previous.sentences.contains(id) || entry.selection.sentences.contains(id)
                });
                selection
            }
            None => Selection::all(&quiz),
        };
        self.quizzes.insert(quiz.id, QuizEntry { quiz, selection });
    }

    pub fn remove_quiz(&mut self, quiz_id: i64) -> Option<Quiz> {
        if self.selected == Some(quiz_id) {
            self.selected = None;
        }
        self.quizzes.remove(&quiz_id).map(|entry| entry.quiz)
    }

    pub fn quiz(&self, quiz_id: i64) -> Option<&Quiz> {
        self.quizzes.get(&quiz_id).map(|entry| &entry.quiz)
    }

    pub fn quizzes(&self) -> impl Iterator<Item = &Quiz> {
        self.quizzes.values().map(|entry| &entry.quiz)
    }

    pub fn select_quiz(&mut self, quiz_id: i64) -> Result<()> {
        if !self.quizzes.contains_key(&quiz_id) {
            return Err(PracticeError::QuizNotFound(quiz_id));
        }
        self.selected = Some(quiz_id);
        Ok(())
    }

    pub fn selected_quiz(&self) -> Option<&Quiz> {
        self.selected.and_then(|id| self.quiz(id))
    }

    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    /// Replace the settings used by sessions started from now on.
    pub fn set_settings(&mut self, settings: PracticeSettings) {
        self.settings = settings;
    }

    pub fn selection(&self, quiz_id: i64) -> Option<&Selection> {
        self.quizzes.get(&quiz_id).map(|entry| &entry.selection)
    }

    /// Toggle a word, and with it all of its variants.
    pub fn set_word_selected(&mut self, quiz_id: i64, word_id: i64, selected: bool) -> Result<()> {
        let entry = self.entry_mut(quiz_id)?;
        if selected {
            if entry.quiz.words.iter().any(|w| w.id == word_id) {
                entry.selection.words.insert(word_id);
            }
        } else {
            entry.selection.words.remove(&word_id);
        }
        Ok(())
    }

    pub fn set_sentence_selected(
        &mut self,
        quiz_id: i64,
        sentence_id: i64,
        selected: bool,
    ) -> Result<()> {
        let entry = self.entry_mut(quiz_id)?;
        if selected {
            if entry.quiz.sentences.iter().any(|s| s.id == sentence_id) {
                entry.selection.sentences.insert(sentence_id);
            }
        } else {
            entry.selection.sentences.remove(&sentence_id);
        }
        Ok(())
    }

    pub fn select_all(&mut self, quiz_id: i64) -> Result<()> {
        let entry = self.entry_mut(quiz_id)?;
        entry.selection = Selection::all(&entry.quiz);
        Ok(())
    }

    pub fn select_none(&mut self, quiz_id: i64) -> Result<()> {
        self.entry_mut(quiz_id)?.selection = Selection::default();
        Ok(())
    }

    /// Record the latest import job state reported for a quiz.
    pub fn apply_progress(&mut self, quiz_id: i64, progress: ImportProgress) -> Result<()> {
        let entry = self.entry_mut(quiz_id)?;
        if entry.quiz.processing_status != progress.status {
            tracing::info!(
                quiz_id,
                from = %entry.quiz.processing_status,
                to = %progress.status,
                "quiz processing status changed"
            );
        }
        entry.quiz.processing_status = progress.status;
        entry.quiz.processing_message = Some(progress.message).filter(|m| !m.is_empty());
        Ok(())
    }

    /// Whether practice may start on the quiz.
    pub fn can_practice(&self, quiz_id: i64) -> bool {
        self.quiz(quiz_id)
            .is_some_and(|quiz| quiz.processing_status.allows_practice())
    }

    /// Deck for the quiz under the current settings and selection.
    pub fn build_deck(&self, quiz_id: i64) -> Result<Vec<DeckItem<'_>>> {
        let entry = self.practicable(quiz_id)?;
        Ok(deck::build(&entry.quiz, &self.settings, &entry.selection))
    }

    /// Start a drill on the quiz under the current settings and selection.
    pub fn start_drill(&self, quiz_id: i64) -> Result<DrillSession<'_>> {
        let deck = self.build_deck(quiz_id)?;
        Ok(DrillSession::new(deck, self.settings.shuffle))
    }

    /// Review scope for the quiz in the current direction.
    ///
    /// Word reviews are limited to the selected words.
    pub fn review_scope(&self, quiz_id: i64, card_type: CardType) -> Result<ReviewScope> {
        let entry = self.practicable(quiz_id)?;
        let scope = ReviewScope::new(quiz_id, card_type, self.settings.direction);
        Ok(scope.with_word_ids(entry.selection.words.iter().copied()))
    }

    fn practicable(&self, quiz_id: i64) -> Result<&QuizEntry> {
        let entry = self
            .quizzes
            .get(&quiz_id)
            .ok_or(PracticeError::QuizNotFound(quiz_id))?;
        let status = entry.quiz.processing_status;
        if !status.allows_practice() {
            return Err(PracticeError::PracticeUnavailable { quiz_id, status });
        }
        Ok(entry)
    }

    fn entry_mut(&mut self, quiz_id: i64) -> Result<&mut QuizEntry> {
        self.quizzes
            .get_mut(&quiz_id)
            .ok_or(PracticeError::QuizNotFound(quiz_id))
    }
}
