use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::QuestionId;

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// The five answer shapes the engine knows how to collect and score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    Hotspot,
    DragAndDrop,
    Essay,
    ShortAnswer,
}

impl QuestionType {
    /// Canonical kebab-case name, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::Hotspot => "hotspot",
            QuestionType::DragAndDrop => "drag-and-drop",
            QuestionType::Essay => "essay",
            QuestionType::ShortAnswer => "short-answer",
        }
    }

    /// Essay and short-answer questions are graded by hand later.
    #[must_use]
    pub fn is_free_text(self) -> bool {
        matches!(self, QuestionType::Essay | QuestionType::ShortAnswer)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── OPTION DATA ───────────────────────────────────────────────────────────────
//

/// One selectable option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub text: String,
}

impl ChoiceOption {
    #[must_use]
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Type-specific option data.
///
/// The variant decides the question type, so a question can never carry
/// option data that disagrees with its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionBody {
    MultipleChoice {
        options: Vec<ChoiceOption>,
    },
    /// Zone labels on an image; each label takes one value from `values`.
    Hotspot {
        labels: Vec<String>,
        #[serde(default)]
        values: Vec<String>,
    },
    DragAndDrop {
        items: Vec<String>,
        zones: Vec<String>,
    },
    Essay,
    ShortAnswer,
}

impl QuestionBody {
    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionBody::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionBody::Hotspot { .. } => QuestionType::Hotspot,
            QuestionBody::DragAndDrop { .. } => QuestionType::DragAndDrop,
            QuestionBody::Essay => QuestionType::Essay,
            QuestionBody::ShortAnswer => QuestionType::ShortAnswer,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// An immutable question record as supplied by the question bank.
///
/// `correct_answer` keeps the author's raw answer key. It is interpreted by
/// the scoring engine, which tolerates malformed input instead of rejecting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    body: QuestionBody,
    correct_answer: String,
    explanation: Option<String>,
    points: Option<u32>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        body: QuestionBody,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            body,
            correct_answer: correct_answer.into(),
            explanation: None,
            points: None,
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        let explanation = explanation.into();
        self.explanation = (!explanation.trim().is_empty()).then_some(explanation);
        self
    }

    /// Author-supplied point value; overrides the derived maximum.
    #[must_use]
    pub fn with_points(mut self, points: Option<u32>) -> Self {
        self.points = points;
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn body(&self) -> &QuestionBody {
        &self.body
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.body.question_type()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn points(&self) -> Option<u32> {
        self.points
    }

    /// True when the author overrode the point value.
    #[must_use]
    pub fn has_custom_points(&self) -> bool {
        self.points.is_some()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_decides_question_type() {
        let q = Question::new(
            QuestionId::new(1),
            "Drag the planets",
            QuestionBody::DragAndDrop {
                items: vec!["Mars".into()],
                zones: vec!["Inner".into()],
            },
            "Mars:Inner",
        );
        assert_eq!(q.question_type(), QuestionType::DragAndDrop);
        assert!(!q.has_custom_points());
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let q = Question::new(QuestionId::new(2), "Why?", QuestionBody::Essay, "")
            .with_explanation("   ");
        assert_eq!(q.explanation(), None);
    }

    #[test]
    fn type_names_are_kebab_case() {
        assert_eq!(QuestionType::ShortAnswer.to_string(), "short-answer");
        let json = serde_json::to_string(&QuestionType::DragAndDrop).unwrap();
        assert_eq!(json, "\"drag-and-drop\"");
    }
}
