//! Interactive session state.
//!
//! A session walks through `Idle → Selecting → Generating → Displaying`.
//! Changing any part of the selection drops displayed sentences and returns
//! to `Selecting`. The sentence buffer only changes on explicit user action.

use std::fmt;

use thiserror::Error;

use crate::error::GenerationError;
use crate::model::{AchievementStandard, Grade, SentenceCounts, StandardKey, Tier};
use crate::results::GeneratedSentences;

/// Where the session is in the select-generate-pick cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Selecting,
    Generating,
    Displaying,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Selecting => "selecting",
            Phase::Generating => "generating",
            Phase::Displaying => "displaying",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition { phase: Phase, action: &'static str },

    #[error("no achievement standard selected")]
    NoStandardSelected,

    #[error("no displayed sentence {tier} #{index}")]
    NoSuchSentence { tier: Tier, index: usize },
}

/// Everything the user has chosen before generating.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub grade: Grade,
    pub subject: String,
    pub domain: Option<String>,
    pub standard: Option<AchievementStandard>,
    pub counts: SentenceCounts,
}

impl Selection {
    pub fn new(grade: Grade, subject: impl Into<String>) -> Self {
        Self {
            grade,
            subject: subject.into(),
            domain: None,
            standard: None,
            counts: SentenceCounts::default(),
        }
    }

    /// Cache identity of the selected standard, if one is selected.
    pub fn standard_key(&self) -> Option<StandardKey> {
        self.standard
            .as_ref()
            .map(|s| StandardKey::new(self.grade, self.subject.clone(), s))
    }
}

/// State of one interactive session.
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    selection: Option<Selection>,
    displayed: Option<GeneratedSentences>,
    warning: Option<String>,
    buffer: Vec<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            selection: None,
            displayed: None,
            warning: None,
            buffer: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Sentences from the last successful generation, while displaying.
    pub fn displayed(&self) -> Option<&GeneratedSentences> {
        self.displayed.as_ref()
    }

    /// Message from the last failed generation.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn buffer(&self) -> &[String] {
        &self.buffer
    }

    /// Record the user's current choices.
    ///
    /// A changed selection resets the session to `Selecting`. Re-selecting
    /// the same choices while displaying keeps the displayed sentences.
    pub fn select(&mut self, selection: Selection) {
        let changed = self.selection.as_ref() != Some(&selection);
        if changed || self.phase == Phase::Idle {
            self.phase = Phase::Selecting;
            self.displayed = None;
            self.warning = None;
        }
        self.selection = Some(selection);
    }

    /// Move to `Generating` and return what should be requested.
    pub fn begin_generation(
        &mut self,
    ) -> Result<(StandardKey, AchievementStandard, SentenceCounts), SessionError> {
        if !matches!(self.phase, Phase::Selecting | Phase::Displaying) {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "generate",
            });
        }
        let selection = self
            .selection
            .as_ref()
            .ok_or(SessionError::NoStandardSelected)?;
        let key = selection
            .standard_key()
            .ok_or(SessionError::NoStandardSelected)?;
        let standard = selection
            .standard
            .clone()
            .ok_or(SessionError::NoStandardSelected)?;
        let counts = selection.counts;

        self.phase = Phase::Generating;
        self.displayed = None;
        self.warning = None;
        Ok((key, standard, counts))
    }

    /// Record the outcome of a generation request.
    ///
    /// Success moves to `Displaying`; failure returns to `Selecting` with a
    /// warning and leaves the buffer untouched.
    pub fn finish_generation(
        &mut self,
        result: Result<GeneratedSentences, GenerationError>,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Generating {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "finish generation",
            });
        }
        match result {
            Ok(generated) => {
                self.displayed = Some(generated);
                self.phase = Phase::Displaying;
            }
            Err(e) => {
                self.warning = Some(e.to_string());
                self.phase = Phase::Selecting;
            }
        }
        Ok(())
    }

    /// Append a sentence to the buffer, adding a final period if missing.
    pub fn append(&mut self, sentence: &str) {
        let mut sentence = sentence.trim().to_string();
        if sentence.is_empty() {
            return;
        }
        if !sentence.ends_with('.') {
            sentence.push('.');
        }
        self.buffer.push(sentence);
    }

    /// Append one of the displayed sentences.
    pub fn pick(&mut self, tier: Tier, index: usize) -> Result<(), SessionError> {
        if self.phase != Phase::Displaying {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "pick a sentence",
            });
        }
        let sentence = self
            .displayed
            .as_ref()
            .and_then(|d| d.sentences.get(tier).get(index))
            .cloned()
            .ok_or(SessionError::NoSuchSentence { tier, index })?;
        self.append(&sentence);
        Ok(())
    }

    /// The assembled free-text summary.
    pub fn summary(&self) -> String {
        self.buffer.join(" ")
    }

    /// Replace the buffer with user-edited text.
    pub fn replace_summary(&mut self, text: &str) {
        self.buffer.clear();
        let text = text.trim();
        if !text.is_empty() {
            self.buffer.push(text.to_string());
        }
    }

    /// Empty the buffer and return to `Idle`.
    pub fn clear_all(&mut self) {
        self.buffer.clear();
        self.displayed = None;
        self.warning = None;
        self.phase = Phase::Idle;
    }
}
