//! Request bodies and identifiers shared by the integration tests.

use serde_json::{json, Value};
use uuid::Uuid;

/// Identifiers for one author writing on one question/answer pair.
#[derive(Debug, Clone)]
pub struct NoteScenario {
    pub author: String,
    pub question: String,
    pub answer: String,
}

impl NoteScenario {
    pub fn new() -> Self {
        Self {
            author: Uuid::now_v7().to_string(),
            question: Uuid::now_v7().to_string(),
            answer: Uuid::now_v7().to_string(),
        }
    }

    /// Same question and answer, different author.
    pub fn with_other_author(&self) -> Self {
        Self {
            author: Uuid::now_v7().to_string(),
            ..self.clone()
        }
    }

    /// Same author and question, different answer.
    pub fn with_other_answer(&self) -> Self {
        Self {
            answer: Uuid::now_v7().to_string(),
            ..self.clone()
        }
    }

    pub fn submit_body(&self, note_text: &str) -> Value {
        json!({
            "noteText": note_text,
            "createdBy": self.author,
            "question": self.question,
            "answerId": self.answer,
        })
    }
}

pub fn new_member() -> String {
    Uuid::now_v7().to_string()
}

pub fn helpful_vote(user_id: &str) -> Value {
    json!({ "voteType": "helpful", "userId": user_id })
}

pub fn not_helpful_vote(user_id: &str, reason: Option<&str>) -> Value {
    match reason {
        Some(reason) => json!({ "voteType": "notHelpful", "userId": user_id, "reason": reason }),
        None => json!({ "voteType": "notHelpful", "userId": user_id }),
    }
}
