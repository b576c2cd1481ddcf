//! Loading agent configuration (prompts + optional article bank) from TOML.
//!
//! See `AgentConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub articles: Vec<ArticleCfg>,
}

/// Article entry accepted in TOML configuration. Lets an operator run the
/// backend against a curated local article bank instead of the built-in seeds.
#[derive(Clone, Debug, Deserialize)]
pub struct ArticleCfg {
  #[serde(default)]
  pub id: Option<String>,
  pub category: String,
  pub title: String,
  pub body: String,
}

/// Prompts used by the LLM client, one system/user pair per generation need.
/// Defaults are sensible for English-from-news training; override in TOML to
/// tune tone or structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  // Vocabulary extraction (strict JSON)
  pub vocabulary_system: String,
  pub vocabulary_user_template: String,
  // Cloze passage (plain text)
  pub cloze_system: String,
  pub cloze_user_template: String,
  // Sentence feedback (strict JSON)
  pub sentence_system: String,
  pub sentence_user_template: String,
  // Hangman hint (plain text)
  pub hint_system: String,
  pub hint_user_template: String,
  // Mind map (strict JSON)
  pub mindmap_system: String,
  pub mindmap_user_template: String,
  // Reading quiz (strict JSON)
  pub quiz_system: String,
  pub quiz_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      vocabulary_system:
        "You are an English learning content generator for Chinese-speaking \
         learners. Respond ONLY with strict JSON.".into(),
      vocabulary_user_template:
        "{article}\n\nFrom this English article, pick exactly {count} words at \
         CEFR level {level} (fall back one level below if the article has too \
         few). Return a JSON object {\"entries\": [...]} where each entry has \
         fields: word, part_of_speech, zh_hant_definition (Traditional \
         Chinese), example_sentence. No duplicates, no extra text.".into(),
      cloze_system:
        "You write short natural English passages for cloze exercises. Output \
         plain text only, no markdown, no headings.".into(),
      cloze_user_template:
        "Write one short English passage at CEFR level {level} that uses each \
         of these words exactly once: {words}. Plain text only.".into(),
      sentence_system:
        "You are a strict but encouraging English writing tutor. Explanations \
         are in Traditional Chinese. Output JSON only.".into(),
      sentence_user_template:
        "Word: {word}\nLearner sentence: {sentence}\n\nReturn JSON \
         {\"is_correct\": boolean, \"explanation\": string} judging whether \
         the word is used correctly in the sentence.".into(),
      hint_system:
        "You describe English words for a guessing game. Never say the word \
         itself or any inflected form of it. Plain text only.".into(),
      hint_user_template:
        "Describe the word '{word}' in one English sentence a CEFR {level} \
         learner can follow, without using the word or its variations.".into(),
      mindmap_system:
        "You turn English articles into mind maps. Respond ONLY with strict \
         JSON.".into(),
      mindmap_user_template:
        "{article}\n\nBuild a mind map of this article as JSON: an object \
         with fields id, text, children (recursive). The root is the article \
         topic, children are the main branches, deeper levels are allowed. \
         Give every node a unique id (root, n1, n1-1, ...).".into(),
      quiz_system:
        "You write English reading-comprehension quizzes. Respond ONLY with \
         strict JSON.".into(),
      quiz_user_template:
        "{article}\n\nWrite exactly 5 quiz items about this article as a JSON \
         object {\"items\": [...]}. Each item has: kind (one of \
         \"true_false\", \"single_choice\", \"multiple_choice\"), question, \
         options (exactly [\"True\", \"False\"] for true_false), correct \
         (array of 0-based option indices; exactly one index unless \
         multiple_choice), explanation.".into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO
/// error, returns None and the backend falls back to defaults + seeds.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "newslex_backend", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "newslex_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "newslex_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
