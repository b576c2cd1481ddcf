//! Hangman: guess a vocabulary word letter by letter on a shared budget of
//! lives. Wrong guesses and hint requests each cost exactly one life;
//! repeating a guessed letter is a free no-op.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Fixed starting budget of lives (shared by wrong guesses and hints).
pub const STARTING_LIVES: u8 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HangmanOutcome {
  Win,
  Loss,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
  /// Letter was already guessed; nothing changes.
  Repeat,
  /// Letter occurs in the target word.
  Hit,
  /// Letter does not occur; one life spent.
  Miss,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HangmanState {
  /// Target word, original casing; all matching is lowercase.
  word: String,
  /// Ordered sequence of unique guessed letters (lowercase).
  guessed: Vec<char>,
  lives_remaining: u8,
  hints_used: u8,
}

impl HangmanState {
  pub fn new(word: &str) -> Self {
    Self {
      word: word.to_string(),
      guessed: Vec::new(),
      lives_remaining: STARTING_LIVES,
      hints_used: 0,
    }
  }

  pub fn word(&self) -> &str {
    &self.word
  }

  pub fn guessed(&self) -> &[char] {
    &self.guessed
  }

  pub fn lives_remaining(&self) -> u8 {
    self.lives_remaining
  }

  pub fn hints_used(&self) -> u8 {
    self.hints_used
  }

  /// Apply one letter guess. Only ASCII letters are accepted.
  pub fn guess(&mut self, letter: char) -> Result<GuessOutcome> {
    if !letter.is_ascii_alphabetic() {
      return Err(CoreError::InvalidInput(format!("guess must be a letter, got {letter:?}")));
    }
    let letter = letter.to_ascii_lowercase();
    if self.guessed.contains(&letter) {
      return Ok(GuessOutcome::Repeat);
    }
    self.guessed.push(letter);
    if self.word.to_ascii_lowercase().contains(letter) {
      Ok(GuessOutcome::Hit)
    } else {
      self.lives_remaining = self.lives_remaining.saturating_sub(1);
      Ok(GuessOutcome::Miss)
    }
  }

  /// A hint costs one life, same as a wrong guess.
  pub fn spend_life_on_hint(&mut self) {
    self.lives_remaining = self.lives_remaining.saturating_sub(1);
    self.hints_used += 1;
  }

  /// Word with unguessed letters masked, e.g. "_ c o _ o _ y".
  pub fn revealed(&self) -> String {
    let parts: Vec<String> = self
      .word
      .chars()
      .map(|c| {
        if !c.is_ascii_alphabetic() || self.guessed.contains(&c.to_ascii_lowercase()) {
          c.to_string()
        } else {
          "_".to_string()
        }
      })
      .collect();
    parts.join(" ")
  }

  pub fn is_won(&self) -> bool {
    self
      .word
      .chars()
      .filter(|c| c.is_ascii_alphabetic())
      .all(|c| self.guessed.contains(&c.to_ascii_lowercase()))
  }

  pub fn is_lost(&self) -> bool {
    self.lives_remaining == 0 && !self.is_won()
  }

  pub fn is_terminal(&self) -> bool {
    self.outcome().is_some()
  }

  /// Win/loss is reported to the caller, never silently absorbed.
  pub fn outcome(&self) -> Option<HangmanOutcome> {
    if self.is_won() {
      Some(HangmanOutcome::Win)
    } else if self.is_lost() {
      Some(HangmanOutcome::Loss)
    } else {
      None
    }
  }
}
