use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id} has an empty prompt")]
    EmptyPrompt { id: QuestionId },

    #[error("question {id} is worth zero points")]
    ZeroPoints { id: QuestionId },

    #[error("question {id}: correct answer {answer:?} is not one of the options")]
    AnswerNotAnOption { id: QuestionId, answer: String },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question in its wire shape.
///
/// Deserialization enforces the field types (no coercion, every field
/// required); `validate` enforces the content rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: u32,
    pub category: String,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, the question is worth
    /// zero points, or the correct answer is not among the options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt { id: self.id });
        }
        if self.points == 0 {
            return Err(QuestionError::ZeroPoints { id: self.id });
        }
        if !self.options.iter().any(|opt| *opt == self.correct_answer) {
            return Err(QuestionError::AnswerNotAnOption {
                id: self.id,
                answer: self.correct_answer,
            });
        }

        Ok(Question {
            id: self.id,
            prompt: self.prompt,
            options: self.options,
            correct_answer: self.correct_answer,
            points: self.points,
            category: self.category,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    points: u32,
    category: String,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Exact string comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.correct_answer == choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new(1),
            prompt: "What is the capital of France?".into(),
            options: vec!["London".into(), "Paris".into()],
            correct_answer: "Paris".into(),
            points: 10,
            category: "Geography".into(),
        }
    }

    #[test]
    fn valid_draft_becomes_question() {
        let q = draft().validate().unwrap();
        assert_eq!(q.id(), QuestionId::new(1));
        assert_eq!(q.points(), 10);
        assert!(q.is_correct("Paris"));
        assert!(!q.is_correct("paris"));
    }

    #[test]
    fn empty_prompt_is_rejected_but_whitespace_is_a_string() {
        let mut d = draft();
        d.prompt = String::new();
        assert!(matches!(
            d.validate(),
            Err(QuestionError::EmptyPrompt { .. })
        ));

        let mut d = draft();
        d.prompt = "   ".into();
        let q = d.validate().unwrap();
        assert_eq!(q.prompt(), "   ");
    }

    #[test]
    fn zero_points_is_rejected() {
        let mut d = draft();
        d.points = 0;
        assert!(matches!(d.validate(), Err(QuestionError::ZeroPoints { .. })));
    }

    #[test]
    fn answer_must_be_an_option() {
        let mut d = draft();
        d.correct_answer = "Rome".into();
        let err = d.validate().unwrap_err();
        assert_eq!(
            err,
            QuestionError::AnswerNotAnOption {
                id: QuestionId::new(1),
                answer: "Rome".into()
            }
        );
    }

    #[test]
    fn wire_shape_uses_question_key() {
        let json = serde_json::json!({
            "id": 3,
            "question": "2 + 2?",
            "options": ["3", "4"],
            "correctAnswer": "4",
            "points": 15,
            "category": "Mathematics"
        });
        let d: QuestionDraft = serde_json::from_value(json).unwrap();
        assert_eq!(d.prompt, "2 + 2?");
        assert_eq!(d.correct_answer, "4");
    }

    #[test]
    fn wire_shape_does_not_coerce_types() {
        let json = serde_json::json!({
            "id": "3",
            "question": "2 + 2?",
            "options": ["3", "4"],
            "correctAnswer": "4",
            "points": 15,
            "category": "Mathematics"
        });
        assert!(serde_json::from_value::<QuestionDraft>(json).is_err());

        let missing_category = serde_json::json!({
            "id": 3,
            "question": "2 + 2?",
            "options": ["3", "4"],
            "correctAnswer": "4",
            "points": 15
        });
        assert!(serde_json::from_value::<QuestionDraft>(missing_category).is_err());
    }
}
