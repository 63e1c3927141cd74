//! Question Bank boundary.
//!
//! Raw question records arrive with inconsistent field names and type spellings.
//! They are normalized here, once, into canonical [`Question`] values so the
//! session engine never sees the raw variants.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use exam_core::model::{ChoiceOption, Question, QuestionBody, QuestionId, QuestionType};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionBankError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed question bank: {0}")]
    Json(#[from] serde_json::Error),

    #[error("question {id} has unknown type {kind:?}")]
    UnknownType { id: QuestionId, kind: String },

    #[error("question id {0} appears more than once")]
    DuplicateId(QuestionId),
}

//
// ─── RAW RECORD ────────────────────────────────────────────────────────────────
//

/// One question as found in a bank file, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    #[serde(alias = "questionId", alias = "question_id")]
    pub id: u64,

    #[serde(default, alias = "question", alias = "questionText", alias = "question_text")]
    pub text: String,

    #[serde(rename = "type", alias = "questionType", alias = "question_type")]
    pub kind: String,

    #[serde(
        default,
        alias = "correctAnswer",
        alias = "correct_answer",
        alias = "answer"
    )]
    pub correct: Value,

    #[serde(default, alias = "pointValue", alias = "point_value", alias = "customPoints")]
    pub points: Option<u32>,

    #[serde(default)]
    pub options: Vec<RawOption>,

    #[serde(default, alias = "hotspots")]
    pub labels: Vec<String>,

    #[serde(default, alias = "hotspotValues", alias = "hotspot_values")]
    pub values: Vec<String>,

    #[serde(default)]
    pub items: Vec<String>,

    #[serde(default)]
    pub zones: Vec<String>,

    #[serde(default)]
    pub explanation: Option<String>,
}

/// A multiple-choice option, either bare text or an explicit label/text pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawOption {
    Labeled { label: String, text: String },
    Text(String),
}

impl QuestionRecord {
    /// Normalize into a canonical question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::UnknownType` when the type string is not recognized.
    pub fn into_question(self) -> Result<Question, QuestionBankError> {
        let id = QuestionId::new(self.id);
        let kind = parse_question_type(&self.kind).ok_or_else(|| QuestionBankError::UnknownType {
            id,
            kind: self.kind.clone(),
        })?;

        let body = match kind {
            QuestionType::MultipleChoice => QuestionBody::MultipleChoice {
                options: self
                    .options
                    .into_iter()
                    .enumerate()
                    .map(|(i, option)| match option {
                        RawOption::Labeled { label, text } => ChoiceOption::new(label, text),
                        RawOption::Text(text) => ChoiceOption::new(option_label(i), text),
                    })
                    .collect(),
            },
            QuestionType::Hotspot => QuestionBody::Hotspot {
                labels: self.labels,
                values: self.values,
            },
            QuestionType::DragAndDrop => QuestionBody::DragAndDrop {
                items: self.items,
                zones: self.zones,
            },
            QuestionType::Essay => QuestionBody::Essay,
            QuestionType::ShortAnswer => QuestionBody::ShortAnswer,
        };

        let mut question = Question::new(id, self.text.trim(), body, answer_key(&self.correct))
            // Zero is treated as "no author value".
            .with_points(self.points.filter(|p| *p > 0));
        if let Some(explanation) = self.explanation {
            question = question.with_explanation(explanation);
        }
        Ok(question)
    }
}

/// Map the many spellings of a question type onto [`QuestionType`].
#[must_use]
pub fn parse_question_type(raw: &str) -> Option<QuestionType> {
    let key: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    match key.as_str() {
        "multiplechoice" | "mc" | "mcq" | "choice" => Some(QuestionType::MultipleChoice),
        "hotspot" => Some(QuestionType::Hotspot),
        "draganddrop" | "dragdrop" | "dnd" => Some(QuestionType::DragAndDrop),
        "essay" => Some(QuestionType::Essay),
        "shortanswer" | "short" => Some(QuestionType::ShortAnswer),
        _ => None,
    }
}

fn option_label(index: usize) -> String {
    // A..Z, then AA, AB ...
    let mut n = index;
    let mut label = Vec::new();
    loop {
        label.push(b'A' + u8::try_from(n % 26).unwrap_or(0));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Flatten the correct-answer field into the textual form the scorer parses.
///
/// Arrays become comma lists, objects become `key:value` lines.
fn answer_key(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}:{}", scalar_text(value)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//
// ─── BANK ──────────────────────────────────────────────────────────────────────
//

#[derive(Deserialize)]
#[serde(untagged)]
enum BankFile {
    List(Vec<QuestionRecord>),
    Wrapped { questions: Vec<QuestionRecord> },
}

/// Loader for ordered question lists.
pub struct QuestionBank;

impl QuestionBank {
    /// Parse a JSON array of records, or an object with a `questions` array.
    ///
    /// Records with blank text are skipped.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError` for malformed JSON, unknown types or duplicate ids.
    pub fn from_json_str(json: &str) -> Result<Vec<Question>, QuestionBankError> {
        let records = match serde_json::from_str::<BankFile>(json)? {
            BankFile::List(records) | BankFile::Wrapped { questions: records } => records,
        };
        Self::from_records(records)
    }

    /// # Errors
    ///
    /// Returns `QuestionBankError::Io` if the file cannot be read, otherwise as
    /// [`QuestionBank::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<Question>, QuestionBankError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| QuestionBankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let questions = Self::from_json_str(&json)?;
        debug!(path = %path.display(), count = questions.len(), "loaded question bank");
        Ok(questions)
    }

    /// # Errors
    ///
    /// Same as [`QuestionBank::from_json_str`] minus JSON errors.
    pub fn from_records(records: Vec<QuestionRecord>) -> Result<Vec<Question>, QuestionBankError> {
        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(records.len());
        for record in records {
            if record.text.trim().is_empty() {
                warn!(id = record.id, "skipping question without text");
                continue;
            }
            let question = record.into_question()?;
            if !seen.insert(question.id()) {
                return Err(QuestionBankError::DuplicateId(question.id()));
            }
            questions.push(question);
        }
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_mixed_field_spellings() {
        let json = r#"[
            {"id": 1, "questionText": "Pick primes", "questionType": "Multiple_Choice",
             "options": ["Two", "Four", "Five"], "correctAnswer": ["A", "C"]},
            {"id": 2, "question": "Label the map", "type": "hotspot",
             "hotspots": ["X", "Y"], "correct_answer": {"X": "north", "Y": "south"},
             "pointValue": 4},
            {"id": 3, "text": "Sort", "question_type": "DragAndDrop",
             "items": ["cat", "oak"], "zones": ["animal", "plant"],
             "answer": "cat:animal\noak:plant", "explanation": "  "}
        ]"#;
        let questions = QuestionBank::from_json_str(json).unwrap();
        assert_eq!(questions.len(), 3);

        assert_eq!(questions[0].question_type(), QuestionType::MultipleChoice);
        assert_eq!(questions[0].correct_answer(), "A,C");
        let QuestionBody::MultipleChoice { options } = questions[0].body() else {
            panic!("expected multiple choice body");
        };
        assert_eq!(options[2], ChoiceOption::new("C", "Five"));

        assert_eq!(questions[1].points(), Some(4));
        assert_eq!(questions[1].correct_answer(), "X:north\nY:south");

        assert_eq!(questions[2].question_type(), QuestionType::DragAndDrop);
        assert_eq!(questions[2].explanation(), None);
    }

    #[test]
    fn object_answers_keep_commas_in_values() {
        let json = r#"[{"id": 1, "text": "Capitals", "type": "hotspot",
            "hotspots": ["X", "Y"], "correctAnswer": {"X": "Paris, France", "Y": "Rome"}}]"#;
        let questions = QuestionBank::from_json_str(json).unwrap();
        let pairs = exam_core::scoring::parse_pairs(questions[0].correct_answer());
        assert_eq!(pairs.get("x").map(String::as_str), Some("paris, france"));
        assert_eq!(exam_core::scoring::max_points(&questions[0]), 2);
    }

    #[test]
    fn skips_records_without_text() {
        let json = r#"{"questions": [
            {"id": 1, "text": "  ", "type": "essay"},
            {"id": 2, "text": "Explain", "type": "essay"}
        ]}"#;
        let questions = QuestionBank::from_json_str(json).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id(), QuestionId::new(2));
    }

    #[test]
    fn rejects_unknown_type_and_duplicates() {
        let err = QuestionBank::from_json_str(r#"[{"id": 7, "text": "?", "type": "matrix"}]"#)
            .unwrap_err();
        assert!(matches!(err, QuestionBankError::UnknownType { kind, .. } if kind == "matrix"));

        let err = QuestionBank::from_json_str(
            r#"[{"id": 1, "text": "a", "type": "essay"}, {"id": 1, "text": "b", "type": "short-answer"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionBankError::DuplicateId(id) if id == QuestionId::new(1)));
    }

    #[test]
    fn type_spellings_normalize() {
        assert_eq!(parse_question_type("mc"), Some(QuestionType::MultipleChoice));
        assert_eq!(parse_question_type("Short Answer"), Some(QuestionType::ShortAnswer));
        assert_eq!(parse_question_type("drag-and-drop"), Some(QuestionType::DragAndDrop));
        assert_eq!(parse_question_type(""), None);
    }

    #[test]
    fn option_labels_continue_past_z() {
        assert_eq!(option_label(0), "A");
        assert_eq!(option_label(25), "Z");
        assert_eq!(option_label(26), "AA");
    }
}
