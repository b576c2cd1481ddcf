//! Domain models shared across the backend: articles, CEFR levels,
//! vocabulary entries, mind-map nodes, and reading-quiz items.

use serde::{Deserialize, Serialize};

/// One normalized news article. Immutable once attached to a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Article {
  pub id: String,
  pub category: String,
  pub title: String,
  pub body: String,
}

/// CEFR proficiency tier used to pitch vocabulary and generated passages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
  A1,
  A2,
  B1,
  B2,
  C1,
  C2,
}

impl CefrLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      CefrLevel::A1 => "A1",
      CefrLevel::A2 => "A2",
      CefrLevel::B1 => "B1",
      CefrLevel::B2 => "B2",
      CefrLevel::C1 => "C1",
      CefrLevel::C2 => "C2",
    }
  }
}

impl std::fmt::Display for CefrLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for CefrLevel {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "A1" => Ok(CefrLevel::A1),
      "A2" => Ok(CefrLevel::A2),
      "B1" => Ok(CefrLevel::B1),
      "B2" => Ok(CefrLevel::B2),
      "C1" => Ok(CefrLevel::C1),
      "C2" => Ok(CefrLevel::C2),
      other => Err(format!("unknown CEFR level: {other}")),
    }
  }
}

/// One leveled vocabulary item derived from the article.
/// Created in bulk by a single generator call, never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VocabularyEntry {
  pub word: String,
  pub part_of_speech: String,
  /// Traditional-Chinese definition, the learner-facing gloss.
  pub definition_zh: String,
  pub level: CefrLevel,
  pub example_sentences: Vec<String>,
}

/// One node of an article mind map: root = topic, children = subtopics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MindMapNode {
  pub id: String,
  pub text: String,
  #[serde(default)]
  pub children: Vec<MindMapNode>,
}

/// Shape of a reading-quiz item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
  TrueFalse,
  SingleChoice,
  MultipleChoice,
}

/// One validated reading-quiz item. The correct set is kept server-side and
/// never serialized into learner-facing views.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizItem {
  pub kind: QuizKind,
  pub question: String,
  pub options: Vec<String>,
  /// Indices into `options`; exactly one for TrueFalse/SingleChoice.
  pub correct: Vec<usize>,
  #[serde(default)]
  pub explanation: String,
}
