use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::question::QuestionType;

/// A user's answer, one shape per question type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    /// Selected option labels (multiple-choice).
    ChoiceSet(BTreeSet<String>),
    /// Zone label to chosen value (hotspot).
    LabelMap(BTreeMap<String, String>),
    /// Item to assigned zone (drag-and-drop).
    ItemZoneMap(BTreeMap<String, String>),
    /// Essay and short-answer text.
    FreeText(String),
}

impl AnswerValue {
    /// The blank answer a fresh or retried question starts with.
    #[must_use]
    pub fn empty_for(kind: QuestionType) -> Self {
        match kind {
            QuestionType::MultipleChoice => AnswerValue::ChoiceSet(BTreeSet::new()),
            QuestionType::Hotspot => AnswerValue::LabelMap(BTreeMap::new()),
            QuestionType::DragAndDrop => AnswerValue::ItemZoneMap(BTreeMap::new()),
            QuestionType::Essay | QuestionType::ShortAnswer => AnswerValue::FreeText(String::new()),
        }
    }

    /// Whether the answer has this question type's shape.
    #[must_use]
    pub fn fits(&self, kind: QuestionType) -> bool {
        matches!(
            (self, kind),
            (AnswerValue::ChoiceSet(_), QuestionType::MultipleChoice)
                | (AnswerValue::LabelMap(_), QuestionType::Hotspot)
                | (AnswerValue::ItemZoneMap(_), QuestionType::DragAndDrop)
                | (
                    AnswerValue::FreeText(_),
                    QuestionType::Essay | QuestionType::ShortAnswer
                )
        )
    }

    /// Nothing selected, assigned, or typed (whitespace counts as nothing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::ChoiceSet(set) => set.is_empty(),
            AnswerValue::LabelMap(map) | AnswerValue::ItemZoneMap(map) => map.is_empty(),
            AnswerValue::FreeText(text) => text.trim().is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_match_their_type() {
        for kind in [
            QuestionType::MultipleChoice,
            QuestionType::Hotspot,
            QuestionType::DragAndDrop,
            QuestionType::Essay,
            QuestionType::ShortAnswer,
        ] {
            let empty = AnswerValue::empty_for(kind);
            assert!(empty.fits(kind), "{kind} should accept its empty value");
            assert!(empty.is_empty());
        }
    }

    #[test]
    fn label_map_does_not_fit_drag_and_drop() {
        let value = AnswerValue::LabelMap(BTreeMap::new());
        assert!(!value.fits(QuestionType::DragAndDrop));
    }

    #[test]
    fn whitespace_text_counts_as_unanswered() {
        assert!(AnswerValue::FreeText("  \n".into()).is_empty());
        assert!(!AnswerValue::FreeText("x".into()).is_empty());
    }

    #[test]
    fn serialized_form_is_tagged() {
        let value = AnswerValue::ChoiceSet(["A".to_string()].into_iter().collect());
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"kind":"choice_set","value":["A"]}"#);
    }
}
