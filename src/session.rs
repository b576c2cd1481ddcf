//! The session state machine: one learner's progression from category pick
//! through article, vocabulary, and practice modes.
//!
//! Every external call (article source, content generator) is mediated here.
//! Nothing is committed to the session until the external call has returned
//! and its output has passed validation, so a failed operation always leaves
//! the session exactly as it was.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{Article, CefrLevel, VocabularyEntry};
use crate::error::{CoreError, Result};
use crate::generator::ContentGenerator;
use crate::practice::cloze::ClozeState;
use crate::practice::hangman::HangmanState;
use crate::practice::mindmap::MindMapState;
use crate::practice::quiz::QuizState;
use crate::practice::sentence::SentenceLog;
use crate::practice::{AdvanceOutcome, PracticeInput, PracticeMode, PracticeState};
use crate::source::ArticleSource;
use crate::util::contains_ignore_case;

/// Accept a vocabulary generation when at least this many entries survive
/// validation; the rest of the request is best-effort.
const MIN_ACCEPTED_WORDS: usize = 1;

/// How many vocabulary words condition a cloze passage.
const CLOZE_WORDS_MAX: usize = 8;

/// Stages of one session, in order. `InPractice` is re-enterable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  SelectingCategory,
  ArticleLoaded,
  VocabularyReady,
  InPractice,
  Completed,
}

/// Idempotence key for vocabulary extraction: a repeat call with the same
/// parameters reuses the cached list instead of invoking the generator again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct VocabRequest {
  article_id: String,
  level: CefrLevel,
  count: usize,
}

/// One learner's session. Owned mutable state lives here and nowhere else.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
  pub id: String,
  pub stage: Stage,
  pub article: Option<Article>,
  pub vocabulary: Vec<VocabularyEntry>,
  vocab_request: Option<VocabRequest>,
  pub practice: Option<PracticeState>,
}

impl Session {
  pub fn new(id: String) -> Self {
    Self {
      id,
      stage: Stage::SelectingCategory,
      article: None,
      vocabulary: Vec::new(),
      vocab_request: None,
      practice: None,
    }
  }

  /// The CEFR level the vocabulary was extracted at (B1 until then).
  pub fn level(&self) -> CefrLevel {
    self.vocab_request.as_ref().map(|r| r.level).unwrap_or(CefrLevel::B1)
  }

  /// Fetch one article for the category and attach it.
  /// Requires `SelectingCategory`; a source failure leaves the stage there.
  pub async fn load_article<S: ArticleSource>(&mut self, source: &S, category: &str) -> Result<()> {
    if self.stage != Stage::SelectingCategory {
      return Err(CoreError::WrongStage { op: "load_article", stage: self.stage });
    }
    let article = source.fetch_latest(category).await?;
    info!(target: "session", session = %self.id, article = %article.id, category = %article.category, "Article loaded");
    self.article = Some(article);
    self.stage = Stage::ArticleLoaded;
    Ok(())
  }

  /// Derive the CEFR-leveled vocabulary list for the loaded article.
  ///
  /// Idempotent per (article, level, count): a repeat with the cached key
  /// returns the existing list without a generator call. Calling with new
  /// parameters is a destructive reset — the old list and any practice
  /// state are discarded once the new generation validates.
  pub async fn extract_vocabulary<G: ContentGenerator>(
    &mut self,
    gen: &G,
    level: CefrLevel,
    count: usize,
  ) -> Result<&[VocabularyEntry]> {
    if !matches!(self.stage, Stage::ArticleLoaded | Stage::VocabularyReady | Stage::InPractice) {
      return Err(CoreError::WrongStage { op: "extract_vocabulary", stage: self.stage });
    }
    if count == 0 {
      return Err(CoreError::InvalidInput("count must be at least 1".into()));
    }

    let article_id = match &self.article {
      Some(a) => a.id.clone(),
      None => return Err(CoreError::WrongStage { op: "extract_vocabulary", stage: self.stage }),
    };

    let key = VocabRequest { article_id, level, count };
    if self.vocab_request.as_ref() == Some(&key) && !self.vocabulary.is_empty() {
      info!(target: "session", session = %self.id, %level, count, "Vocabulary request served from cache");
      return Ok(&self.vocabulary);
    }

    let drafts = {
      // article presence checked above; borrow only for the duration of the call
      let body = self.article.as_ref().map(|a| a.body.as_str()).unwrap_or_default();
      gen.extract_vocabulary(body, level, count).await?
    };

    let mut seen = HashSet::<String>::new();
    let mut entries = Vec::<VocabularyEntry>::new();
    for draft in drafts {
      let word = draft.word.trim().to_string();
      if word.is_empty() {
        warn!(target: "session", session = %self.id, "Dropping draft entry: empty word");
        continue;
      }
      if !seen.insert(word.to_ascii_lowercase()) {
        warn!(target: "session", session = %self.id, %word, "Dropping draft entry: duplicate word");
        continue;
      }
      if draft.part_of_speech.trim().is_empty() {
        warn!(target: "session", session = %self.id, %word, "Dropping draft entry: missing part of speech");
        continue;
      }
      let definition = draft.definition_zh.trim().to_string();
      if definition.is_empty() || !definition.chars().any(crate::util::is_cjk) {
        warn!(target: "session", session = %self.id, %word, "Dropping draft entry: missing Chinese definition");
        continue;
      }
      let example = draft.example_sentence.trim().to_string();
      if example.is_empty() {
        warn!(target: "session", session = %self.id, %word, "Dropping draft entry: missing example sentence");
        continue;
      }
      entries.push(VocabularyEntry {
        word,
        part_of_speech: draft.part_of_speech.trim().to_string(),
        definition_zh: definition,
        level,
        example_sentences: vec![example],
      });
    }

    if entries.len() < MIN_ACCEPTED_WORDS {
      return Err(CoreError::GenerationInvalid(format!(
        "only {} valid vocabulary entries after validation",
        entries.len()
      )));
    }
    entries.truncate(count);

    info!(target: "session", session = %self.id, %level, requested = count, accepted = entries.len(), "Vocabulary ready");
    self.vocabulary = entries;
    self.vocab_request = Some(key);
    self.practice = None;
    self.stage = Stage::VocabularyReady;
    Ok(&self.vocabulary)
  }

  /// Enter (or switch to) a practice mode. Always builds a fresh state;
  /// whatever was in progress before is discarded. On any failure the
  /// previous stage and practice state are untouched.
  pub async fn enter_practice<G: ContentGenerator>(
    &mut self,
    gen: &G,
    mode: PracticeMode,
  ) -> Result<()> {
    if !matches!(self.stage, Stage::VocabularyReady | Stage::InPractice) {
      return Err(CoreError::WrongStage { op: "enter_practice", stage: self.stage });
    }

    let fresh = match mode {
      PracticeMode::Hangman => {
        let entry = self
          .vocabulary
          .choose(&mut rand::thread_rng())
          .ok_or_else(|| CoreError::InvalidInput("session has no vocabulary".into()))?;
        PracticeState::Hangman(HangmanState::new(&entry.word))
      }
      PracticeMode::Cloze => {
        let words: Vec<String> = self
          .vocabulary
          .iter()
          .take(CLOZE_WORDS_MAX)
          .map(|e| e.word.clone())
          .collect();
        let passage = gen.cloze_passage(&words, self.level()).await?;
        PracticeState::Cloze(ClozeState::build(&passage, &words)?)
      }
      PracticeMode::SentenceFeedback => PracticeState::SentenceFeedback(SentenceLog::new()),
      PracticeMode::MindMap => {
        let draft = {
          let body = self.article.as_ref().map(|a| a.body.as_str()).unwrap_or_default();
          gen.mind_map(body).await?
        };
        PracticeState::MindMap(MindMapState::validate(draft)?)
      }
      PracticeMode::ReadingQuiz => {
        let drafts = {
          let body = self.article.as_ref().map(|a| a.body.as_str()).unwrap_or_default();
          gen.reading_quiz(body).await?
        };
        PracticeState::ReadingQuiz(QuizState::from_drafts(drafts)?)
      }
    };

    info!(target: "session", session = %self.id, ?mode, "Practice mode entered");
    self.practice = Some(fresh);
    self.stage = Stage::InPractice;
    Ok(())
  }

  /// Apply one learner action to the active practice mode.
  pub async fn advance_practice<G: ContentGenerator>(
    &mut self,
    gen: &G,
    input: PracticeInput,
  ) -> Result<AdvanceOutcome> {
    if self.stage != Stage::InPractice {
      return Err(CoreError::NoActiveMode);
    }
    let Some(practice) = self.practice.as_mut() else {
      return Err(CoreError::NoActiveMode);
    };

    match (practice, input) {
      (PracticeState::Hangman(h), PracticeInput::Guess { letter }) => {
        if h.is_terminal() {
          return Err(CoreError::InvalidInput("hangman round already finished".into()));
        }
        let result = h.guess(letter)?;
        Ok(AdvanceOutcome::HangmanGuess {
          letter: letter.to_ascii_lowercase(),
          hit: result == crate::practice::hangman::GuessOutcome::Hit,
          repeated: result == crate::practice::hangman::GuessOutcome::Repeat,
          revealed: h.revealed(),
          lives_remaining: h.lives_remaining(),
          outcome: h.outcome(),
        })
      }

      (PracticeState::Hangman(h), PracticeInput::Hint) => {
        if h.is_terminal() {
          return Err(CoreError::InvalidInput("hangman round already finished".into()));
        }
        let word = h.word().to_string();
        let level = self.level();
        // The life is only spent once the generator has answered; a
        // transport failure costs the learner nothing.
        let described = gen.describe_word(&word, level).await?;
        let (hint, fallback) = if contains_ignore_case(&described, &word) {
          warn!(target: "session", session = %self.id, "Hint mentioned the target word; using fallback");
          (fallback_hint(&self.vocabulary, &word), true)
        } else {
          (described, false)
        };
        // re-borrow after the await; the practice slot cannot have changed
        let Some(PracticeState::Hangman(h)) = self.practice.as_mut() else {
          return Err(CoreError::NoActiveMode);
        };
        h.spend_life_on_hint();
        Ok(AdvanceOutcome::HangmanHint {
          hint,
          fallback,
          lives_remaining: h.lives_remaining(),
          outcome: h.outcome(),
        })
      }

      (PracticeState::Cloze(c), PracticeInput::FillBlank { blank, answer }) => {
        let correct = c.submit(blank, &answer)?;
        Ok(AdvanceOutcome::ClozeAnswer {
          blank,
          correct,
          solved: c.solved(),
          blanks: c.blanks_total(),
          terminal: c.is_terminal(),
        })
      }

      (PracticeState::SentenceFeedback(_), PracticeInput::Sentence { word, sentence }) => {
        let sentence = sentence.trim().to_string();
        if sentence.is_empty() {
          return Err(CoreError::InvalidInput("empty sentence".into()));
        }
        if !self.vocabulary.iter().any(|e| e.word.eq_ignore_ascii_case(&word)) {
          return Err(CoreError::UnknownWord(word));
        }
        let verdict = gen.sentence_feedback(&word, &sentence).await?;
        let Some(PracticeState::SentenceFeedback(log)) = self.practice.as_mut() else {
          return Err(CoreError::NoActiveMode);
        };
        log.append(&word, &sentence, verdict.clone());
        Ok(AdvanceOutcome::SentenceFeedback {
          word,
          is_correct: verdict.is_correct,
          explanation: verdict.explanation,
        })
      }

      (PracticeState::ReadingQuiz(q), PracticeInput::Answer { item, selected }) => {
        let correct = q.answer(item, selected)?;
        Ok(AdvanceOutcome::QuizAnswer {
          item,
          correct,
          answered: q.answered(),
          terminal: q.is_terminal(),
        })
      }

      (other, _) => Err(CoreError::InputMismatch(other.mode().as_str())),
    }
  }

  /// Close the session. An unfinished practice mode must be explicitly
  /// abandoned; a terminal (or absent) one completes cleanly.
  pub fn complete(&mut self, abandon: bool) -> Result<()> {
    match self.stage {
      Stage::SelectingCategory | Stage::Completed => {
        Err(CoreError::WrongStage { op: "complete", stage: self.stage })
      }
      _ => {
        if let Some(p) = &self.practice {
          if !p.is_terminal() && !abandon {
            return Err(CoreError::InvalidInput(
              "active practice is not finished; abandon it explicitly".into(),
            ));
          }
        }
        info!(target: "session", session = %self.id, "Session completed");
        self.practice = None;
        self.stage = Stage::Completed;
        Ok(())
      }
    }
  }
}

/// Local hint used when the generated description leaked the target word.
/// Built only from entry metadata, so it can never contain the word itself.
fn fallback_hint(vocabulary: &[VocabularyEntry], word: &str) -> String {
  let letters = word.chars().count();
  match vocabulary.iter().find(|e| e.word.eq_ignore_ascii_case(word)) {
    Some(e) => format!(
      "It is a {} of {} letters that appeared in the article.",
      e.part_of_speech, letters
    ),
    None => format!("It is a word of {} letters from the article.", letters),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  use crate::domain::{MindMapNode, QuizKind};
  use crate::generator::{QuizItemDraft, SentenceVerdict, VocabularyDraft};
  use crate::practice::hangman::{HangmanOutcome, STARTING_LIVES};

  fn draft(word: &str) -> VocabularyDraft {
    VocabularyDraft {
      word: word.into(),
      part_of_speech: "noun".into(),
      definition_zh: "測試定義".into(),
      example_sentence: format!("The {word} was mentioned."),
    }
  }

  fn quiz_drafts() -> Vec<QuizItemDraft> {
    (0..5)
      .map(|i| QuizItemDraft {
        kind: QuizKind::TrueFalse,
        question: format!("Statement {i} is supported by the article."),
        options: vec!["True".into(), "False".into()],
        correct: vec![i % 2],
        answer: None,
        explanation: String::new(),
      })
      .collect()
  }

  /// Scripted generator: canned outputs plus call counters.
  #[derive(Default)]
  struct ScriptedGenerator {
    vocab: Vec<VocabularyDraft>,
    passage: String,
    hint: String,
    fail_hint: bool,
    vocab_calls: AtomicUsize,
    hint_calls: AtomicUsize,
  }

  impl ScriptedGenerator {
    fn with_vocab(words: &[&str]) -> Self {
      Self {
        vocab: words.iter().map(|w| draft(w)).collect(),
        passage: String::new(),
        hint: "A short description.".into(),
        ..Default::default()
      }
    }
  }

  impl ContentGenerator for ScriptedGenerator {
    async fn extract_vocabulary(
      &self,
      _article_body: &str,
      _level: CefrLevel,
      _count: usize,
    ) -> crate::error::Result<Vec<VocabularyDraft>> {
      self.vocab_calls.fetch_add(1, Ordering::SeqCst);
      Ok(self.vocab.clone())
    }

    async fn cloze_passage(
      &self,
      _words: &[String],
      _level: CefrLevel,
    ) -> crate::error::Result<String> {
      Ok(self.passage.clone())
    }

    async fn sentence_feedback(
      &self,
      _word: &str,
      _sentence: &str,
    ) -> crate::error::Result<SentenceVerdict> {
      Ok(SentenceVerdict { is_correct: true, explanation: "用法正確。".into() })
    }

    async fn describe_word(
      &self,
      _word: &str,
      _level: CefrLevel,
    ) -> crate::error::Result<String> {
      self.hint_calls.fetch_add(1, Ordering::SeqCst);
      if self.fail_hint {
        return Err(CoreError::GenerationFailed("provider timeout".into()));
      }
      Ok(self.hint.clone())
    }

    async fn mind_map(&self, _article_body: &str) -> crate::error::Result<MindMapNode> {
      Ok(MindMapNode {
        id: "root".into(),
        text: "Topic".into(),
        children: vec![MindMapNode { id: "n1".into(), text: "Branch".into(), children: vec![] }],
      })
    }

    async fn reading_quiz(
      &self,
      _article_body: &str,
    ) -> crate::error::Result<Vec<QuizItemDraft>> {
      Ok(quiz_drafts())
    }
  }

  struct StaticSource(Article);
  impl ArticleSource for StaticSource {
    async fn fetch_latest(&self, _category: &str) -> crate::error::Result<Article> {
      Ok(self.0.clone())
    }
  }

  struct FailingSource;
  impl ArticleSource for FailingSource {
    async fn fetch_latest(&self, _category: &str) -> crate::error::Result<Article> {
      Err(CoreError::SourceUnavailable("feed down".into()))
    }
  }

  fn business_article() -> Article {
    Article {
      id: "a1".into(),
      category: "business".into(),
      title: "Bakeries".into(),
      body: "Bakeries sell bread and pastry to loyal customers.".into(),
    }
  }

  async fn ready_session(gen: &ScriptedGenerator, count: usize) -> Session {
    let mut s = Session::new("s1".into());
    s.load_article(&StaticSource(business_article()), "business").await.expect("article");
    s.extract_vocabulary(gen, CefrLevel::B1, count).await.expect("vocabulary");
    s
  }

  #[tokio::test]
  async fn end_to_end_business_b1_hangman() {
    let gen =
      ScriptedGenerator::with_vocab(&["bakery", "subscription", "revenue", "customer", "flour"]);
    let mut s = ready_session(&gen, 5).await;
    assert_eq!(s.stage, Stage::VocabularyReady);
    assert_eq!(s.vocabulary.len(), 5);

    s.enter_practice(&gen, PracticeMode::Hangman).await.expect("hangman");
    assert_eq!(s.stage, Stage::InPractice);

    // none of the vocabulary words contain q, x or z
    for wrong in ['q', 'x', 'z'] {
      let out = s.advance_practice(&gen, PracticeInput::Guess { letter: wrong }).await.expect("guess");
      match out {
        AdvanceOutcome::HangmanGuess { hit, .. } => assert!(!hit),
        _ => panic!("unexpected outcome"),
      }
    }
    // the target is picked at random; read it back so every remaining
    // guess is an exact hit
    let target = match &s.practice {
      Some(PracticeState::Hangman(h)) => {
        assert_eq!(h.lives_remaining(), STARTING_LIVES - 3);
        assert!(!h.is_terminal());
        h.word().to_string()
      }
      _ => panic!("hangman expected"),
    };

    // hits are free, so guessing exactly the target's letters wins on the
    // last one without touching the remaining lives
    let mut letters: Vec<char> = target.chars().collect();
    letters.sort_unstable();
    letters.dedup();
    for letter in letters {
      s.advance_practice(&gen, PracticeInput::Guess { letter }).await.expect("guess");
    }
    match &s.practice {
      Some(PracticeState::Hangman(h)) => {
        assert_eq!(h.outcome(), Some(HangmanOutcome::Win));
        assert_eq!(h.lives_remaining(), STARTING_LIVES - 3);
      }
      _ => panic!("hangman expected"),
    }
  }

  #[tokio::test]
  async fn vocabulary_drops_invalid_and_duplicate_drafts() {
    let mut gen = ScriptedGenerator::with_vocab(&["bakery", "revenue"]);
    gen.vocab.push(draft("Bakery")); // duplicate, case-insensitive
    gen.vocab.push(draft("")); // empty word
    gen.vocab.push(VocabularyDraft { definition_zh: "no cjk".into(), ..draft("flour") });
    gen.vocab.push(VocabularyDraft { example_sentence: "  ".into(), ..draft("pastry") });
    let s = ready_session(&gen, 10).await;

    let words: Vec<&str> = s.vocabulary.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["bakery", "revenue"]);
    assert!(s.vocabulary.iter().all(|e| !e.example_sentences.is_empty()));
    let mut lowered: Vec<String> = words.iter().map(|w| w.to_ascii_lowercase()).collect();
    lowered.sort();
    lowered.dedup();
    assert_eq!(lowered.len(), words.len());
  }

  #[tokio::test]
  async fn vocabulary_request_is_cached_per_parameters() {
    let gen = ScriptedGenerator::with_vocab(&["bakery", "revenue", "flour"]);
    let mut s = ready_session(&gen, 3).await;
    assert_eq!(gen.vocab_calls.load(Ordering::SeqCst), 1);

    s.extract_vocabulary(&gen, CefrLevel::B1, 3).await.expect("cached");
    assert_eq!(gen.vocab_calls.load(Ordering::SeqCst), 1);

    // different parameters are a real re-generation
    s.extract_vocabulary(&gen, CefrLevel::B1, 2).await.expect("regenerated");
    assert_eq!(gen.vocab_calls.load(Ordering::SeqCst), 2);
    assert_eq!(s.vocabulary.len(), 2);
  }

  #[tokio::test]
  async fn invalid_generation_leaves_stage_untouched() {
    let gen = ScriptedGenerator::with_vocab(&[""]);
    let mut s = Session::new("s1".into());
    s.load_article(&StaticSource(business_article()), "business").await.expect("article");
    let err = s.extract_vocabulary(&gen, CefrLevel::B1, 5).await.unwrap_err();
    assert!(matches!(err, CoreError::GenerationInvalid(_)));
    assert_eq!(s.stage, Stage::ArticleLoaded);
    assert!(s.vocabulary.is_empty());
  }

  #[tokio::test]
  async fn source_failure_leaves_stage_untouched() {
    let mut s = Session::new("s1".into());
    let err = s.load_article(&FailingSource, "business").await.unwrap_err();
    assert!(matches!(err, CoreError::SourceUnavailable(_)));
    assert_eq!(s.stage, Stage::SelectingCategory);
    assert!(s.article.is_none());
  }

  #[tokio::test]
  async fn reentering_a_mode_discards_prior_state() {
    let mut gen = ScriptedGenerator::with_vocab(&["bakery", "flour"]);
    gen.passage = "The bakery needs flour.".into();
    let mut s = ready_session(&gen, 2).await;

    s.enter_practice(&gen, PracticeMode::Hangman).await.expect("hangman");
    s.advance_practice(&gen, PracticeInput::Guess { letter: 'q' }).await.expect("guess");
    s.enter_practice(&gen, PracticeMode::Cloze).await.expect("cloze");
    s.enter_practice(&gen, PracticeMode::Hangman).await.expect("hangman again");

    match &s.practice {
      Some(PracticeState::Hangman(h)) => {
        assert_eq!(h.lives_remaining(), STARTING_LIVES);
        assert!(h.guessed().is_empty());
      }
      _ => panic!("hangman expected"),
    }
  }

  #[tokio::test]
  async fn leaked_hint_is_replaced_by_fallback() {
    let mut gen = ScriptedGenerator::with_vocab(&["bakery"]);
    gen.hint = "A Bakery is a shop that sells bread.".into();
    let mut s = ready_session(&gen, 1).await;
    s.enter_practice(&gen, PracticeMode::Hangman).await.expect("hangman");

    let out = s.advance_practice(&gen, PracticeInput::Hint).await.expect("hint");
    match out {
      AdvanceOutcome::HangmanHint { hint, fallback, lives_remaining, .. } => {
        assert!(fallback);
        assert!(!contains_ignore_case(&hint, "bakery"));
        assert_eq!(lives_remaining, STARTING_LIVES - 1);
      }
      _ => panic!("hint outcome expected"),
    }
  }

  #[tokio::test]
  async fn failed_hint_costs_no_life() {
    let mut gen = ScriptedGenerator::with_vocab(&["bakery"]);
    gen.fail_hint = true;
    let mut s = ready_session(&gen, 1).await;
    s.enter_practice(&gen, PracticeMode::Hangman).await.expect("hangman");

    let err = s.advance_practice(&gen, PracticeInput::Hint).await.unwrap_err();
    assert!(matches!(err, CoreError::GenerationFailed(_)));
    match &s.practice {
      Some(PracticeState::Hangman(h)) => {
        assert_eq!(h.lives_remaining(), STARTING_LIVES);
        assert_eq!(h.hints_used(), 0);
      }
      _ => panic!("hangman expected"),
    }
  }

  #[tokio::test]
  async fn advance_without_practice_is_no_active_mode() {
    let gen = ScriptedGenerator::with_vocab(&["bakery"]);
    let mut s = ready_session(&gen, 1).await;
    let err = s.advance_practice(&gen, PracticeInput::Hint).await.unwrap_err();
    assert!(matches!(err, CoreError::NoActiveMode));
  }

  #[tokio::test]
  async fn mismatched_input_kind_is_rejected() {
    let gen = ScriptedGenerator::with_vocab(&["bakery"]);
    let mut s = ready_session(&gen, 1).await;
    s.enter_practice(&gen, PracticeMode::Hangman).await.expect("hangman");
    let err = s
      .advance_practice(&gen, PracticeInput::FillBlank { blank: 1, answer: "x".into() })
      .await
      .unwrap_err();
    assert!(matches!(err, CoreError::InputMismatch(_)));
  }

  #[tokio::test]
  async fn sentence_feedback_requires_a_vocabulary_word() {
    let gen = ScriptedGenerator::with_vocab(&["bakery"]);
    let mut s = ready_session(&gen, 1).await;
    s.enter_practice(&gen, PracticeMode::SentenceFeedback).await.expect("mode");

    let err = s
      .advance_practice(
        &gen,
        PracticeInput::Sentence { word: "spaceship".into(), sentence: "A spaceship flies.".into() },
      )
      .await
      .unwrap_err();
    assert!(matches!(err, CoreError::UnknownWord(_)));

    let out = s
      .advance_practice(
        &gen,
        PracticeInput::Sentence { word: "bakery".into(), sentence: "The bakery opens early.".into() },
      )
      .await
      .expect("feedback");
    assert!(matches!(out, AdvanceOutcome::SentenceFeedback { is_correct: true, .. }));
    match &s.practice {
      Some(PracticeState::SentenceFeedback(log)) => assert_eq!(log.entries().len(), 1),
      _ => panic!("sentence log expected"),
    }
  }

  #[tokio::test]
  async fn mind_map_does_not_support_advance() {
    let gen = ScriptedGenerator::with_vocab(&["bakery"]);
    let mut s = ready_session(&gen, 1).await;
    s.enter_practice(&gen, PracticeMode::MindMap).await.expect("mind map");
    let err = s
      .advance_practice(&gen, PracticeInput::Guess { letter: 'a' })
      .await
      .unwrap_err();
    assert!(matches!(err, CoreError::InputMismatch(_)));
  }

  #[tokio::test]
  async fn failed_practice_init_preserves_previous_mode() {
    let mut gen = ScriptedGenerator::with_vocab(&["bakery"]);
    gen.passage = "Nothing relevant here.".into(); // cloze build will fail
    let mut s = ready_session(&gen, 1).await;
    s.enter_practice(&gen, PracticeMode::Hangman).await.expect("hangman");

    let err = s.enter_practice(&gen, PracticeMode::Cloze).await.unwrap_err();
    assert!(matches!(err, CoreError::GenerationInvalid(_)));
    assert_eq!(s.stage, Stage::InPractice);
    assert!(matches!(s.practice, Some(PracticeState::Hangman(_))));
  }

  #[tokio::test]
  async fn completing_requires_terminal_or_abandoned_practice() {
    let gen = ScriptedGenerator::with_vocab(&["bakery"]);
    let mut s = ready_session(&gen, 1).await;
    s.enter_practice(&gen, PracticeMode::Hangman).await.expect("hangman");

    let err = s.complete(false).unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
    assert_eq!(s.stage, Stage::InPractice);

    s.complete(true).expect("abandoned");
    assert_eq!(s.stage, Stage::Completed);
    assert!(s.practice.is_none());
  }

  #[tokio::test]
  async fn operations_are_guarded_by_stage() {
    let gen = ScriptedGenerator::with_vocab(&["bakery"]);
    let mut s = Session::new("s1".into());

    let err = s.extract_vocabulary(&gen, CefrLevel::B1, 5).await.unwrap_err();
    assert!(matches!(err, CoreError::WrongStage { op: "extract_vocabulary", .. }));

    let err = s.enter_practice(&gen, PracticeMode::Hangman).await.unwrap_err();
    assert!(matches!(err, CoreError::WrongStage { op: "enter_practice", .. }));

    s.load_article(&StaticSource(business_article()), "business").await.expect("article");
    let err = s.load_article(&StaticSource(business_article()), "business").await.unwrap_err();
    assert!(matches!(err, CoreError::WrongStage { op: "load_article", .. }));
  }
}
