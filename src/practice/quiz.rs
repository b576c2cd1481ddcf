//! Reading quiz: exactly five generated items over the article, each
//! answered at most once. Item shapes are validated against their kind
//! before the quiz is accepted.

use serde::{Deserialize, Serialize};

use crate::domain::{QuizItem, QuizKind};
use crate::error::{CoreError, Result};
use crate::generator::QuizItemDraft;

pub const QUIZ_LEN: usize = 5;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizAnswer {
  pub selected: Vec<usize>,
  pub correct: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizState {
  items: Vec<QuizItem>,
  answers: Vec<Option<QuizAnswer>>,
}

impl QuizState {
  /// Validate a generated batch: exactly five items, each matching its
  /// kind's option/answer shape.
  pub fn from_drafts(drafts: Vec<QuizItemDraft>) -> Result<Self> {
    if drafts.len() != QUIZ_LEN {
      return Err(CoreError::GenerationInvalid(format!(
        "expected {QUIZ_LEN} quiz items, got {}",
        drafts.len()
      )));
    }
    let items = drafts
      .into_iter()
      .enumerate()
      .map(|(i, d)| validate_item(i, d))
      .collect::<Result<Vec<_>>>()?;
    let answers = vec![None; items.len()];
    Ok(Self { items, answers })
  }

  pub fn items(&self) -> &[QuizItem] {
    &self.items
  }

  pub fn answers(&self) -> &[Option<QuizAnswer>] {
    &self.answers
  }

  pub fn answered(&self) -> usize {
    self.answers.iter().filter(|a| a.is_some()).count()
  }

  /// Record one answer for one item; out-of-range indices and re-answering
  /// are caller errors. Correct means the selected set equals the key.
  pub fn answer(&mut self, item_index: usize, selected: Vec<usize>) -> Result<bool> {
    let item = self
      .items
      .get(item_index)
      .ok_or(CoreError::OutOfRange { index: item_index, len: self.items.len() })?;
    if self.answers[item_index].is_some() {
      return Err(CoreError::AlreadyAnswered(item_index));
    }
    if selected.is_empty() {
      return Err(CoreError::InvalidInput("no option selected".into()));
    }
    for &s in &selected {
      if s >= item.options.len() {
        return Err(CoreError::OutOfRange { index: s, len: item.options.len() });
      }
    }
    let mut selected = selected;
    selected.sort_unstable();
    selected.dedup();
    if item.kind != QuizKind::MultipleChoice && selected.len() != 1 {
      return Err(CoreError::InvalidInput("exactly one option must be selected".into()));
    }

    let correct = selected == item.correct;
    self.answers[item_index] = Some(QuizAnswer { selected, correct });
    Ok(correct)
  }

  /// Terminal once every item has one recorded answer.
  pub fn is_terminal(&self) -> bool {
    self.answers.iter().all(|a| a.is_some())
  }
}

fn validate_item(index: usize, draft: QuizItemDraft) -> Result<QuizItem> {
  let invalid = |msg: String| CoreError::GenerationInvalid(format!("quiz item {index}: {msg}"));

  if draft.question.trim().is_empty() {
    return Err(invalid("empty question".into()));
  }

  let (options, mut correct) = match draft.kind {
    QuizKind::TrueFalse => {
      // Accept either a bare boolean answer or two options + one index.
      let options = if draft.options.is_empty() {
        vec!["True".to_string(), "False".to_string()]
      } else {
        draft.options
      };
      if options.len() != 2 {
        return Err(invalid(format!("true/false needs exactly 2 options, got {}", options.len())));
      }
      let correct = match draft.answer {
        Some(true) => vec![0],
        Some(false) => vec![1],
        None => draft.correct,
      };
      (options, correct)
    }
    QuizKind::SingleChoice | QuizKind::MultipleChoice => {
      if draft.options.len() < 2 {
        return Err(invalid(format!("needs at least 2 options, got {}", draft.options.len())));
      }
      (draft.options, draft.correct)
    }
  };

  correct.sort_unstable();
  correct.dedup();
  if correct.is_empty() {
    return Err(invalid("no correct option".into()));
  }
  if draft.kind != QuizKind::MultipleChoice && correct.len() != 1 {
    return Err(invalid(format!("needs exactly 1 correct option, got {}", correct.len())));
  }
  if let Some(&max) = correct.last() {
    if max >= options.len() {
      return Err(invalid(format!("correct index {max} out of range ({})", options.len())));
    }
  }

  Ok(QuizItem {
    kind: draft.kind,
    question: draft.question,
    options,
    correct,
    explanation: draft.explanation,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft(kind: QuizKind, options: &[&str], correct: &[usize]) -> QuizItemDraft {
    QuizItemDraft {
      kind,
      question: "What did the article say?".into(),
      options: options.iter().map(|s| s.to_string()).collect(),
      correct: correct.to_vec(),
      answer: None,
      explanation: String::new(),
    }
  }

  fn five_good_drafts() -> Vec<QuizItemDraft> {
    vec![
      draft(QuizKind::TrueFalse, &["True", "False"], &[0]),
      draft(QuizKind::SingleChoice, &["a", "b", "c"], &[1]),
      draft(QuizKind::MultipleChoice, &["a", "b", "c", "d"], &[0, 2]),
      draft(QuizKind::SingleChoice, &["a", "b"], &[0]),
      draft(QuizKind::TrueFalse, &["True", "False"], &[1]),
    ]
  }

  #[test]
  fn five_items_are_required() {
    let err = QuizState::from_drafts(five_good_drafts()[..3].to_vec()).unwrap_err();
    assert!(matches!(err, CoreError::GenerationInvalid(_)));
    assert!(QuizState::from_drafts(five_good_drafts()).is_ok());
  }

  #[test]
  fn true_false_accepts_bare_boolean_answers() {
    let mut drafts = five_good_drafts();
    drafts[0] = QuizItemDraft { options: vec![], correct: vec![], answer: Some(false), ..drafts[0].clone() };
    let quiz = QuizState::from_drafts(drafts).expect("quiz");
    assert_eq!(quiz.items()[0].options, vec!["True", "False"]);
    assert_eq!(quiz.items()[0].correct, vec![1]);
  }

  #[test]
  fn malformed_shapes_are_rejected() {
    let mut drafts = five_good_drafts();
    drafts[1] = draft(QuizKind::SingleChoice, &["a", "b", "c"], &[0, 2]); // two keys
    assert!(QuizState::from_drafts(drafts).is_err());

    let mut drafts = five_good_drafts();
    drafts[2] = draft(QuizKind::MultipleChoice, &["a", "b"], &[5]); // key out of range
    assert!(QuizState::from_drafts(drafts).is_err());
  }

  #[test]
  fn answering_twice_or_out_of_range_fails() {
    let mut quiz = QuizState::from_drafts(five_good_drafts()).expect("quiz");
    assert!(quiz.answer(1, vec![1]).expect("answer"));
    assert!(matches!(quiz.answer(1, vec![0]), Err(CoreError::AlreadyAnswered(1))));
    assert!(matches!(quiz.answer(9, vec![0]), Err(CoreError::OutOfRange { .. })));
    assert!(matches!(quiz.answer(0, vec![5]), Err(CoreError::OutOfRange { .. })));
  }

  #[test]
  fn multiple_choice_compares_the_whole_set() {
    let mut quiz = QuizState::from_drafts(five_good_drafts()).expect("quiz");
    assert!(!quiz.answer(2, vec![0]).expect("answer")); // partial selection is wrong
    let mut quiz = QuizState::from_drafts(five_good_drafts()).expect("quiz");
    assert!(quiz.answer(2, vec![2, 0]).expect("answer")); // order does not matter
  }

  #[test]
  fn terminal_after_all_five_answers() {
    let mut quiz = QuizState::from_drafts(five_good_drafts()).expect("quiz");
    for i in 0..QUIZ_LEN {
      let sel = if quiz.items()[i].kind == QuizKind::MultipleChoice { vec![0, 2] } else { vec![0] };
      quiz.answer(i, sel).expect("answer");
    }
    assert!(quiz.is_terminal());
    assert_eq!(quiz.answered(), QUIZ_LEN);
  }
}
