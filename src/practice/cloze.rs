//! Cloze: a generated passage with every occurrence of the selected
//! vocabulary words blanked out as `___[n]___` markers (1-based), matched
//! case-insensitively on full-word boundaries.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

fn word_pattern() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"[A-Za-z]+").expect("static word pattern"))
}

/// One blank, bound to the word that was removed (original casing kept for
/// display after solving; scoring is case-insensitive).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Blank {
  pub id: usize,
  pub word: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmittedAnswer {
  pub text: String,
  pub correct: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClozeState {
  /// Passage with `___[n]___` markers in place of the blanked words.
  passage: String,
  blanks: Vec<Blank>,
  /// blank id -> submitted answer; a blank is scored at most once.
  answers: BTreeMap<usize, SubmittedAnswer>,
}

impl ClozeState {
  /// Blank out every occurrence of the target words in the passage.
  /// Fails with `GenerationInvalid` when the generated passage does not
  /// actually contain any of the words.
  pub fn build(passage: &str, words: &[String]) -> Result<Self> {
    let targets: HashSet<String> = words.iter().map(|w| w.to_ascii_lowercase()).collect();

    let mut blanks = Vec::new();
    let mut out = String::with_capacity(passage.len());
    let mut pos = 0usize;

    for m in word_pattern().find_iter(passage) {
      if !targets.contains(&m.as_str().to_ascii_lowercase()) {
        continue;
      }
      let id = blanks.len() + 1;
      out.push_str(&passage[pos..m.start()]);
      out.push_str(&format!("___[{id}]___"));
      blanks.push(Blank { id, word: m.as_str().to_string() });
      pos = m.end();
    }
    out.push_str(&passage[pos..]);

    if blanks.is_empty() {
      return Err(CoreError::GenerationInvalid(
        "cloze passage contains none of the selected words".into(),
      ));
    }

    Ok(Self { passage: out, blanks, answers: BTreeMap::new() })
  }

  pub fn passage(&self) -> &str {
    &self.passage
  }

  pub fn blanks_total(&self) -> usize {
    self.blanks.len()
  }

  pub fn answers(&self) -> &BTreeMap<usize, SubmittedAnswer> {
    &self.answers
  }

  pub fn solved(&self) -> usize {
    self.answers.values().filter(|a| a.correct).count()
  }

  /// Record one answer for a blank. Scoring compares case-insensitively
  /// against the removed word; a second submission for the same blank fails.
  pub fn submit(&mut self, blank_id: usize, answer: &str) -> Result<bool> {
    let blank = self
      .blanks
      .iter()
      .find(|b| b.id == blank_id)
      .ok_or(CoreError::OutOfRange { index: blank_id, len: self.blanks.len() })?;
    if self.answers.contains_key(&blank_id) {
      return Err(CoreError::AlreadyAnswered(blank_id));
    }
    let text = answer.trim().to_string();
    let correct = text.eq_ignore_ascii_case(&blank.word);
    self.answers.insert(blank_id, SubmittedAnswer { text, correct });
    Ok(correct)
  }

  /// Terminal once every blank has been answered (right or wrong).
  pub fn is_terminal(&self) -> bool {
    self.answers.len() == self.blanks.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn every_occurrence_is_blanked_case_insensitively() {
    let state = ClozeState::build(
      "Economy matters. The economy grew, and growth helped.",
      &words(&["economy", "growth"]),
    )
    .expect("cloze");
    assert_eq!(state.blanks_total(), 3);
    assert_eq!(
      state.passage(),
      "___[1]___ matters. The ___[2]___ grew, and ___[3]___ helped."
    );
  }

  #[test]
  fn partial_word_matches_are_not_blanked() {
    let state =
      ClozeState::build("The bee flew to the beekeeper.", &words(&["bee"])).expect("cloze");
    // "beekeeper" must stay intact; only the standalone word is blanked
    assert_eq!(state.blanks_total(), 1);
    assert_eq!(state.passage(), "The ___[1]___ flew to the beekeeper.");
  }

  #[test]
  fn scoring_is_case_insensitive() {
    let mut state = ClozeState::build("A cat sat.", &words(&["cat"])).expect("cloze");
    assert!(state.submit(1, "Cat").expect("submit"));
    assert!(state.is_terminal());
  }

  #[test]
  fn second_submission_for_same_blank_fails() {
    let mut state = ClozeState::build("A cat sat.", &words(&["cat", "sat"])).expect("cloze");
    assert!(!state.submit(1, "dog").expect("submit"));
    assert!(matches!(state.submit(1, "cat"), Err(CoreError::AlreadyAnswered(1))));
    assert!(!state.is_terminal());
  }

  #[test]
  fn unknown_blank_id_is_out_of_range() {
    let mut state = ClozeState::build("A cat sat.", &words(&["cat"])).expect("cloze");
    assert!(matches!(state.submit(9, "cat"), Err(CoreError::OutOfRange { index: 9, len: 1 })));
  }

  #[test]
  fn passage_without_targets_is_rejected() {
    let err = ClozeState::build("Nothing relevant here.", &words(&["economy"])).unwrap_err();
    assert!(matches!(err, CoreError::GenerationInvalid(_)));
  }
}
