//! Content generation: the `ContentGenerator` contract and the LLM-backed
//! `LlmClient` implementation.
//!
//! We only call chat.completions and request either plain text or a strict
//! JSON object. Calls are instrumented and log model names, latencies, and
//! response sizes (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{CefrLevel, MindMapNode, QuizKind};
use crate::error::{CoreError, Result};
use crate::util::{fill_template, trunc_for_log};

/// Raw vocabulary entry as produced by the generator, before validation.
#[derive(Clone, Debug, Deserialize)]
pub struct VocabularyDraft {
  #[serde(default)]
  pub word: String,
  #[serde(default)]
  pub part_of_speech: String,
  #[serde(default, rename = "zh_hant_definition", alias = "zh-Hant_definition")]
  pub definition_zh: String,
  #[serde(default)]
  pub example_sentence: String,
}

/// Generator verdict on one learner sentence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SentenceVerdict {
  pub is_correct: bool,
  pub explanation: String,
}

/// Raw quiz item as produced by the generator, before shape validation.
#[derive(Clone, Debug, Deserialize)]
pub struct QuizItemDraft {
  pub kind: QuizKind,
  #[serde(default)]
  pub question: String,
  #[serde(default)]
  pub options: Vec<String>,
  #[serde(default)]
  pub correct: Vec<usize>,
  /// Some models answer true/false items with a bare boolean instead of an
  /// index into the options; accept both.
  #[serde(default)]
  pub answer: Option<bool>,
  #[serde(default)]
  pub explanation: String,
}

/// One independently fallible request/response call per generation need.
/// The session state machine is the only caller; practice engines express
/// their needs through it.
pub trait ContentGenerator: Send + Sync {
  fn extract_vocabulary(
    &self,
    article_body: &str,
    level: CefrLevel,
    count: usize,
  ) -> impl Future<Output = Result<Vec<VocabularyDraft>>> + Send;

  fn cloze_passage(
    &self,
    words: &[String],
    level: CefrLevel,
  ) -> impl Future<Output = Result<String>> + Send;

  fn sentence_feedback(
    &self,
    word: &str,
    sentence: &str,
  ) -> impl Future<Output = Result<SentenceVerdict>> + Send;

  fn describe_word(
    &self,
    word: &str,
    level: CefrLevel,
  ) -> impl Future<Output = Result<String>> + Send;

  fn mind_map(&self, article_body: &str) -> impl Future<Output = Result<MindMapNode>> + Send;

  fn reading_quiz(
    &self,
    article_body: &str,
  ) -> impl Future<Output = Result<Vec<QuizItemDraft>>> + Send;
}

#[derive(Clone)]
pub struct LlmClient {
  client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
  prompts: Prompts,
}

impl LlmClient {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(prompts: Prompts) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let fast_model =
      std::env::var("OPENAI_FAST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let strong_model =
      std::env::var("OPENAI_STRONG_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, fast_model, strong_model, prompts })
  }

  /// Plain-text chat completion. Used for cloze passages and hints.
  #[instrument(level = "info", target = "generator", skip(self, system, user), fields(model = %model))]
  async fn chat_plain(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<String> {
    let text = self.chat_raw(model, system, user, temperature, false).await?;
    Ok(text.trim().to_string())
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", target = "generator", skip(self, system, user), fields(model = %model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T> {
    let text = self.chat_raw(model, system, user, temperature, true).await?;
    serde_json::from_str::<T>(&text)
      .map_err(|e| CoreError::GenerationInvalid(format!("unparseable generation: {e}")))
  }

  async fn chat_raw(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
    json_object: bool,
  ) -> Result<String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: model.to_string(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: json_object.then(|| ResponseFormat { r#type: "json_object".into() }),
      max_tokens: None,
    };

    let start = std::time::Instant::now();
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "newslex-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| CoreError::GenerationFailed(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_provider_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
      error!(target: "generator", %status, error = %msg, "Provider returned an error");
      return Err(CoreError::GenerationFailed(format!("provider HTTP {status}: {msg}")));
    }

    let body: ChatCompletionResponse = res
      .json()
      .await
      .map_err(|e| CoreError::GenerationFailed(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(
        target: "generator",
        prompt_tokens = ?usage.prompt_tokens,
        completion_tokens = ?usage.completion_tokens,
        total_tokens = ?usage.total_tokens,
        elapsed = ?start.elapsed(),
        "Provider usage"
      );
    }
    let text = body
      .choices
      .first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();
    if text.trim().is_empty() {
      return Err(CoreError::GenerationInvalid("empty generation".into()));
    }
    Ok(text)
  }
}

#[derive(Deserialize)]
struct VocabularyEnvelope {
  entries: Vec<VocabularyDraft>,
}

#[derive(Deserialize)]
struct QuizEnvelope {
  items: Vec<QuizItemDraft>,
}

impl ContentGenerator for LlmClient {
  #[instrument(level = "info", target = "generator", skip(self, article_body), fields(%level, count, body_len = article_body.len()))]
  async fn extract_vocabulary(
    &self,
    article_body: &str,
    level: CefrLevel,
    count: usize,
  ) -> Result<Vec<VocabularyDraft>> {
    let user = fill_template(
      &self.prompts.vocabulary_user_template,
      &[
        ("article", article_body),
        ("level", level.as_str()),
        ("count", &count.to_string()),
      ],
    );
    let env: VocabularyEnvelope = self
      .chat_json(&self.strong_model, &self.prompts.vocabulary_system, &user, 0.7)
      .await?;
    info!(target: "generator", drafts = env.entries.len(), "Vocabulary generated");
    Ok(env.entries)
  }

  #[instrument(level = "info", target = "generator", skip(self, words), fields(%level, words = words.len()))]
  async fn cloze_passage(&self, words: &[String], level: CefrLevel) -> Result<String> {
    let joined = words.join(", ");
    let user = fill_template(
      &self.prompts.cloze_user_template,
      &[("words", joined.as_str()), ("level", level.as_str())],
    );
    self.chat_plain(&self.strong_model, &self.prompts.cloze_system, &user, 0.8).await
  }

  #[instrument(level = "info", target = "generator", skip(self, sentence), fields(%word, sentence_len = sentence.len()))]
  async fn sentence_feedback(&self, word: &str, sentence: &str) -> Result<SentenceVerdict> {
    let user = fill_template(
      &self.prompts.sentence_user_template,
      &[("word", word), ("sentence", sentence)],
    );
    self.chat_json(&self.strong_model, &self.prompts.sentence_system, &user, 0.2).await
  }

  #[instrument(level = "info", target = "generator", skip(self), fields(%word, %level))]
  async fn describe_word(&self, word: &str, level: CefrLevel) -> Result<String> {
    let user = fill_template(
      &self.prompts.hint_user_template,
      &[("word", word), ("level", level.as_str())],
    );
    self.chat_plain(&self.fast_model, &self.prompts.hint_system, &user, 0.7).await
  }

  #[instrument(level = "info", target = "generator", skip(self, article_body), fields(body_len = article_body.len()))]
  async fn mind_map(&self, article_body: &str) -> Result<MindMapNode> {
    let user = fill_template(&self.prompts.mindmap_user_template, &[("article", article_body)]);
    self.chat_json(&self.strong_model, &self.prompts.mindmap_system, &user, 0.3).await
  }

  #[instrument(level = "info", target = "generator", skip(self, article_body), fields(body_len = article_body.len()))]
  async fn reading_quiz(&self, article_body: &str) -> Result<Vec<QuizItemDraft>> {
    let user = fill_template(&self.prompts.quiz_user_template, &[("article", article_body)]);
    let env: QuizEnvelope = self
      .chat_json(&self.strong_model, &self.prompts.quiz_system, &user, 0.3)
      .await?;
    info!(target: "generator", items = env.items.len(), "Quiz generated");
    Ok(env.items)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq {
  role: String,
  content: String,
}
#[derive(Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")]
  r#type: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)]
  usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessageResp,
}
#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)]
  prompt_tokens: Option<u32>,
  #[serde(default)]
  completion_tokens: Option<u32>,
  #[serde(default)]
  total_tokens: Option<u32>,
}

/// Try to extract a clean error message from the provider error body.
fn extract_provider_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
