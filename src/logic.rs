//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Every operation follows the same shape: look the session up, take its
//! lock without waiting (a held lock means another operation is in flight
//! and the caller gets `StateConflict`), run the state-machine transition,
//! persist on success.

use tracing::{info, instrument};

use crate::domain::{CefrLevel, MindMapNode};
use crate::error::{CoreError, Result};
use crate::generator::{ContentGenerator, LlmClient, QuizItemDraft, SentenceVerdict, VocabularyDraft};
use crate::practice::{AdvanceOutcome, PracticeInput, PracticeMode};
use crate::protocol::{to_out, SessionOut};
use crate::session::Session;
use crate::state::{AppState, SharedSession};

/// Forwards to the LLM client when one is configured; otherwise every call
/// fails as a retryable generation error. Keeps generation-free operations
/// (guesses, cloze answers, quiz answers) working without an API key.
struct MaybeGenerator<'a>(Option<&'a LlmClient>);

fn offline() -> CoreError {
  CoreError::GenerationFailed("content generation disabled (OPENAI_API_KEY not set)".into())
}

impl ContentGenerator for MaybeGenerator<'_> {
  async fn extract_vocabulary(
    &self,
    article_body: &str,
    level: CefrLevel,
    count: usize,
  ) -> Result<Vec<VocabularyDraft>> {
    match self.0 {
      Some(c) => c.extract_vocabulary(article_body, level, count).await,
      None => Err(offline()),
    }
  }

  async fn cloze_passage(&self, words: &[String], level: CefrLevel) -> Result<String> {
    match self.0 {
      Some(c) => c.cloze_passage(words, level).await,
      None => Err(offline()),
    }
  }

  async fn sentence_feedback(&self, word: &str, sentence: &str) -> Result<SentenceVerdict> {
    match self.0 {
      Some(c) => c.sentence_feedback(word, sentence).await,
      None => Err(offline()),
    }
  }

  async fn describe_word(&self, word: &str, level: CefrLevel) -> Result<String> {
    match self.0 {
      Some(c) => c.describe_word(word, level).await,
      None => Err(offline()),
    }
  }

  async fn mind_map(&self, article_body: &str) -> Result<MindMapNode> {
    match self.0 {
      Some(c) => c.mind_map(article_body).await,
      None => Err(offline()),
    }
  }

  async fn reading_quiz(&self, article_body: &str) -> Result<Vec<QuizItemDraft>> {
    match self.0 {
      Some(c) => c.reading_quiz(article_body).await,
      None => Err(offline()),
    }
  }
}

/// Take the per-session lock without waiting. One writer per session.
fn lock(shared: &SharedSession) -> Result<tokio::sync::MutexGuard<'_, Session>> {
  shared.try_lock().map_err(|_| CoreError::StateConflict)
}

#[instrument(level = "info", skip(state))]
pub async fn create_session(state: &AppState) -> SessionOut {
  let shared = state.create_session().await;
  let session = shared.lock().await;
  to_out(&session)
}

#[instrument(level = "debug", skip(state), fields(%session_id))]
pub async fn get_session(state: &AppState, session_id: &str) -> Result<SessionOut> {
  let shared = state.session(session_id).await?;
  let session = lock(&shared)?;
  Ok(to_out(&session))
}

pub fn list_categories(state: &AppState) -> Vec<String> {
  state.desk.categories()
}

#[instrument(level = "info", skip(state), fields(%session_id, %category))]
pub async fn load_article(state: &AppState, session_id: &str, category: &str) -> Result<SessionOut> {
  let shared = state.session(session_id).await?;
  let mut session = lock(&shared)?;
  session.load_article(state.desk.as_ref(), category).await?;
  state.persist(&session);
  Ok(to_out(&session))
}

#[instrument(level = "info", skip(state), fields(%session_id, %level, count))]
pub async fn extract_vocabulary(
  state: &AppState,
  session_id: &str,
  level: &str,
  count: usize,
) -> Result<SessionOut> {
  let level: CefrLevel = level.parse().map_err(CoreError::InvalidInput)?;
  let shared = state.session(session_id).await?;
  let mut session = lock(&shared)?;
  let accepted = session
    .extract_vocabulary(&MaybeGenerator(state.llm.as_ref()), level, count)
    .await?
    .len();
  info!(target: "session", session = %session_id, %level, accepted, "Vocabulary served");
  state.persist(&session);
  Ok(to_out(&session))
}

#[instrument(level = "info", skip(state), fields(%session_id, ?mode))]
pub async fn enter_practice(
  state: &AppState,
  session_id: &str,
  mode: PracticeMode,
) -> Result<SessionOut> {
  let shared = state.session(session_id).await?;
  let mut session = lock(&shared)?;
  session.enter_practice(&MaybeGenerator(state.llm.as_ref()), mode).await?;
  state.persist(&session);
  Ok(to_out(&session))
}

#[instrument(level = "info", skip(state, input), fields(%session_id))]
pub async fn advance(
  state: &AppState,
  session_id: &str,
  input: PracticeInput,
) -> Result<(AdvanceOutcome, SessionOut)> {
  let shared = state.session(session_id).await?;
  let mut session = lock(&shared)?;
  let outcome = session.advance_practice(&MaybeGenerator(state.llm.as_ref()), input).await?;
  state.persist(&session);
  Ok((outcome, to_out(&session)))
}

#[instrument(level = "info", skip(state), fields(%session_id, abandon))]
pub async fn complete(state: &AppState, session_id: &str, abandon: bool) -> Result<SessionOut> {
  let shared = state.session(session_id).await?;
  let mut session = lock(&shared)?;
  session.complete(abandon)?;
  state.persist(&session);
  Ok(to_out(&session))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn end_session(state: &AppState, session_id: &str) -> Result<()> {
  // resolve first so an unknown id is a 404, not a silent no-op
  let _ = state.session(session_id).await?;
  state.remove_session(session_id).await;
  Ok(())
}
