//! Sentence feedback: the learner writes a sentence for a vocabulary word
//! and the generator judges it. The log is append-only, one entry per
//! attempt; the mode is never terminal — the learner decides when to stop.

use serde::{Deserialize, Serialize};

use crate::generator::SentenceVerdict;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SentenceAttempt {
  pub word: String,
  pub sentence: String,
  pub is_correct: bool,
  pub explanation: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SentenceLog {
  entries: Vec<SentenceAttempt>,
}

impl SentenceLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn append(&mut self, word: &str, sentence: &str, verdict: SentenceVerdict) {
    self.entries.push(SentenceAttempt {
      word: word.to_string(),
      sentence: sentence.to_string(),
      is_correct: verdict.is_correct,
      explanation: verdict.explanation,
    });
  }

  pub fn entries(&self) -> &[SentenceAttempt] {
    &self.entries
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn attempts_accumulate_per_word() {
    let mut log = SentenceLog::new();
    log.append(
      "steady",
      "The income was steady.",
      SentenceVerdict { is_correct: true, explanation: "用法正確。".into() },
    );
    log.append(
      "steady",
      "He steady the job.",
      SentenceVerdict { is_correct: false, explanation: "詞性錯誤。".into() },
    );
    assert_eq!(log.entries().len(), 2);
    assert!(log.entries()[0].is_correct);
    assert!(!log.entries()[1].is_correct);
  }
}
