//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Article, VocabularyEntry};
use crate::practice::{AdvanceOutcome, PracticeInput, PracticeMode, PracticeView};
use crate::session::{Session, Stage};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListCategories,
    NewSession,
    GetSession {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    LoadArticle {
        #[serde(rename = "sessionId")]
        session_id: String,
        category: String,
    },
    ExtractVocabulary {
        #[serde(rename = "sessionId")]
        session_id: String,
        level: String,
        count: usize,
    },
    EnterPractice {
        #[serde(rename = "sessionId")]
        session_id: String,
        mode: PracticeMode,
    },
    Advance {
        #[serde(rename = "sessionId")]
        session_id: String,
        input: PracticeInput,
    },
    Complete {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(default)]
        abandon: bool,
    },
    EndSession {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Categories {
        categories: Vec<String>,
    },
    Session {
        session: SessionOut,
    },
    Advanced {
        outcome: AdvanceOutcome,
        session: SessionOut,
    },
    Ended {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Error {
        message: String,
        retryable: bool,
    },
}

/// Learner-facing session snapshot used by both WS and HTTP. The practice
/// field is the redacted view, never the raw practice state.
#[derive(Debug, Serialize)]
pub struct SessionOut {
    pub id: String,
    pub stage: Stage,
    pub article: Option<Article>,
    pub vocabulary: Vec<VocabularyEntry>,
    pub practice: Option<PracticeView>,
}

/// Convert the internal `Session` to the public DTO.
pub fn to_out(s: &Session) -> SessionOut {
    SessionOut {
        id: s.id.clone(),
        stage: s.stage,
        article: s.article.clone(),
        vocabulary: s.vocabulary.clone(),
        practice: s.practice.as_ref().map(|p| p.view()),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct LoadArticleIn {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct VocabularyIn {
    pub level: String,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct PracticeIn {
    pub mode: PracticeMode,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceIn {
    pub input: PracticeInput,
}
#[derive(Serialize)]
pub struct AdvanceOut {
    pub outcome: AdvanceOutcome,
    pub session: SessionOut,
}

#[derive(Debug, Deserialize)]
pub struct CompleteIn {
    #[serde(default)]
    pub abandon: bool,
}

#[derive(Serialize)]
pub struct CategoriesOut {
    pub categories: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
    pub retryable: bool,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse_from_camel_case_ids() {
        let msg: ClientWsMessage = serde_json::from_str(
            r#"{"type":"extract_vocabulary","sessionId":"s1","level":"B1","count":5}"#,
        )
        .expect("parse");
        match msg {
            ClientWsMessage::ExtractVocabulary { session_id, level, count } => {
                assert_eq!(session_id, "s1");
                assert_eq!(level, "B1");
                assert_eq!(count, 5);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn advance_carries_a_tagged_practice_input() {
        let msg: ClientWsMessage = serde_json::from_str(
            r#"{"type":"advance","sessionId":"s1","input":{"kind":"guess","letter":"a"}}"#,
        )
        .expect("parse");
        assert!(matches!(
            msg,
            ClientWsMessage::Advance { input: PracticeInput::Guess { letter: 'a' }, .. }
        ));
    }
}
