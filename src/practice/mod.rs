//! Practice modes: one shared capability surface (fresh construction,
//! advance, terminal check, learner-facing view) over five rule sets.
//!
//! The concrete states are tagged variants selected by `PracticeMode`; the
//! session state machine owns exactly one live `PracticeState` at a time and
//! rebuilds it from scratch whenever a mode is (re-)entered.

pub mod cloze;
pub mod hangman;
pub mod mindmap;
pub mod quiz;
pub mod sentence;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{MindMapNode, QuizKind};
use cloze::{ClozeState, SubmittedAnswer};
use hangman::{HangmanOutcome, HangmanState};
use mindmap::MindMapState;
use quiz::{QuizAnswer, QuizState};
use sentence::{SentenceAttempt, SentenceLog};

/// Tag identifying which practice variant is live on a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeMode {
  Hangman,
  Cloze,
  SentenceFeedback,
  MindMap,
  ReadingQuiz,
}

/// Mutable state of the active practice mode. Serialized as part of the
/// session record so practice survives a process restart.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PracticeState {
  Hangman(HangmanState),
  Cloze(ClozeState),
  SentenceFeedback(SentenceLog),
  MindMap(MindMapState),
  ReadingQuiz(QuizState),
}

impl PracticeMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      PracticeMode::Hangman => "hangman",
      PracticeMode::Cloze => "cloze",
      PracticeMode::SentenceFeedback => "sentence_feedback",
      PracticeMode::MindMap => "mind_map",
      PracticeMode::ReadingQuiz => "reading_quiz",
    }
  }
}

impl PracticeState {
  pub fn mode(&self) -> PracticeMode {
    match self {
      PracticeState::Hangman(_) => PracticeMode::Hangman,
      PracticeState::Cloze(_) => PracticeMode::Cloze,
      PracticeState::SentenceFeedback(_) => PracticeMode::SentenceFeedback,
      PracticeState::MindMap(_) => PracticeMode::MindMap,
      PracticeState::ReadingQuiz(_) => PracticeMode::ReadingQuiz,
    }
  }

  /// Whether the mode has reached a natural end. Sentence feedback never
  /// does (the learner decides when to stop); a mind map is complete the
  /// moment it exists.
  pub fn is_terminal(&self) -> bool {
    match self {
      PracticeState::Hangman(h) => h.is_terminal(),
      PracticeState::Cloze(c) => c.is_terminal(),
      PracticeState::SentenceFeedback(_) => false,
      PracticeState::MindMap(_) => true,
      PracticeState::ReadingQuiz(q) => q.is_terminal(),
    }
  }

  /// Learner-facing snapshot. Redacts everything the learner must not see:
  /// the hangman target, cloze solutions, quiz answer keys.
  pub fn view(&self) -> PracticeView {
    match self {
      PracticeState::Hangman(h) => PracticeView::Hangman {
        revealed: h.revealed(),
        guessed: h.guessed().to_vec(),
        lives_remaining: h.lives_remaining(),
        hints_used: h.hints_used(),
        outcome: h.outcome(),
      },
      PracticeState::Cloze(c) => PracticeView::Cloze {
        passage: c.passage().to_string(),
        blanks: c.blanks_total(),
        answered: c.answers().clone(),
        solved: c.solved(),
      },
      PracticeState::SentenceFeedback(log) => {
        PracticeView::SentenceFeedback { entries: log.entries().to_vec() }
      }
      PracticeState::MindMap(m) => PracticeView::MindMap { root: m.root().clone() },
      PracticeState::ReadingQuiz(q) => PracticeView::ReadingQuiz {
        items: q
          .items()
          .iter()
          .zip(q.answers())
          .map(|(item, answer)| QuizItemView {
            kind: item.kind,
            question: item.question.clone(),
            options: item.options.clone(),
            answer: answer.clone(),
          })
          .collect(),
        answered: q.answered(),
      },
    }
  }
}

/// One learner action against the active practice mode.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PracticeInput {
  /// Hangman: guess one letter.
  Guess { letter: char },
  /// Hangman: spend a life on a generated description of the target word.
  Hint,
  /// Cloze: answer one blank.
  FillBlank { blank: usize, answer: String },
  /// Sentence feedback: submit one sentence for one vocabulary word.
  Sentence { word: String, sentence: String },
  /// Reading quiz: answer one item with one or more selected options.
  Answer { item: usize, selected: Vec<usize> },
}

/// What one `advance` call did, reported back to the caller.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdvanceOutcome {
  HangmanGuess {
    letter: char,
    hit: bool,
    repeated: bool,
    revealed: String,
    lives_remaining: u8,
    outcome: Option<HangmanOutcome>,
  },
  HangmanHint {
    hint: String,
    /// True when the generated description mentioned the target word and a
    /// local fallback hint was substituted.
    fallback: bool,
    lives_remaining: u8,
    outcome: Option<HangmanOutcome>,
  },
  ClozeAnswer { blank: usize, correct: bool, solved: usize, blanks: usize, terminal: bool },
  SentenceFeedback { word: String, is_correct: bool, explanation: String },
  QuizAnswer { item: usize, correct: bool, answered: usize, terminal: bool },
}

/// Redacted practice snapshot for HTTP/WS delivery and persistence views.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PracticeView {
  Hangman {
    revealed: String,
    guessed: Vec<char>,
    lives_remaining: u8,
    hints_used: u8,
    outcome: Option<HangmanOutcome>,
  },
  Cloze {
    passage: String,
    blanks: usize,
    answered: BTreeMap<usize, SubmittedAnswer>,
    solved: usize,
  },
  SentenceFeedback { entries: Vec<SentenceAttempt> },
  MindMap { root: MindMapNode },
  ReadingQuiz { items: Vec<QuizItemView>, answered: usize },
}

/// Quiz item as shown to the learner: no correct set, no explanation until
/// the item has been answered (the answer record carries correctness only).
#[derive(Clone, Debug, Serialize)]
pub struct QuizItemView {
  pub kind: QuizKind,
  pub question: String,
  pub options: Vec<String>,
  pub answer: Option<QuizAnswer>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn view_never_leaks_the_hangman_target() {
    let state = PracticeState::Hangman(HangmanState::new("secret"));
    let json = serde_json::to_string(&state.view()).expect("json");
    assert!(!json.contains("secret"));
  }

  #[test]
  fn quiz_view_never_leaks_the_answer_key() {
    let drafts = vec![
      crate::generator::QuizItemDraft {
        kind: QuizKind::SingleChoice,
        question: "Pick one".into(),
        options: vec!["alpha".into(), "bravo".into()],
        correct: vec![1],
        answer: None,
        explanation: "bravo is right".into(),
      };
      5
    ];
    let state = PracticeState::ReadingQuiz(QuizState::from_drafts(drafts).expect("quiz"));
    let json = serde_json::to_string(&state.view()).expect("json");
    assert!(!json.contains("correct\":[1]"));
    assert!(!json.contains("bravo is right"));
  }

  #[test]
  fn practice_state_round_trips_through_serde() {
    let mut h = HangmanState::new("market");
    h.guess('m').expect("guess");
    h.guess('z').expect("guess");
    let state = PracticeState::Hangman(h);
    let json = serde_json::to_string(&state).expect("json");
    let back: PracticeState = serde_json::from_str(&json).expect("parse");
    assert_eq!(back.mode(), PracticeMode::Hangman);
    match back {
      PracticeState::Hangman(h) => {
        assert_eq!(h.lives_remaining(), hangman::STARTING_LIVES - 1);
        assert_eq!(h.guessed(), &['m', 'z']);
      }
      _ => panic!("wrong variant"),
    }
  }
}
