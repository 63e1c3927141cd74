//! Pure scoring rules: `(Question, AnswerValue) -> points` and `Question -> max points`.
//!
//! Nothing in here fails. An answer key that cannot be parsed
//! degrades to an empty set or map, which scores 0.
//!
//! Answer key formats:
//! - multiple-choice: comma-separated labels, e.g. `"A, C"`
//! - hotspot / drag-and-drop: `key:value` pairs, one per line or separated by
//!   `;`, e.g. `"X:a; Y:b"`. A single line of pairs may use `,` instead.
//!   Pairs without a `:` (or `=`) are ignored.
//!
//! Labels, keys and values compare trimmed and case-insensitively.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{AnswerValue, Question, QuestionType};

/// Awarded points next to the achievable maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub points: u32,
    pub max_points: u32,
}

impl Grade {
    /// Full marks. A zero-point question is never "full".
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.max_points > 0 && self.points >= self.max_points
    }
}

//
// ─── PARSING ───────────────────────────────────────────────────────────────────
//

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse a comma-separated label list into a normalized set.
#[must_use]
pub fn parse_choice_set(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(normalize)
        .filter(|label| !label.is_empty())
        .collect()
}

/// Parse `key:value` pairs into a normalized map.
///
/// Later duplicates of a key win. Pairs are split on newlines and `;`. A
/// single-line key falls back to `,` only when every comma-separated piece is
/// itself a pair, so a value like `Paris, France` stays whole.
#[must_use]
pub fn parse_pairs(raw: &str) -> BTreeMap<String, String> {
    let is_pair = |piece: &str| piece.contains([':', '=']);
    let pieces: Vec<&str> = if raw.contains(['\n', ';']) {
        raw.split(['\n', ';']).collect()
    } else if raw.split(',').all(is_pair) {
        raw.split(',').collect()
    } else {
        vec![raw]
    };
    pieces
        .into_iter()
        .filter_map(|pair| pair.split_once([':', '=']))
        .map(|(key, value)| (normalize(key), normalize(value)))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .collect()
}

fn normalized_set(set: &BTreeSet<String>) -> BTreeSet<String> {
    set.iter()
        .map(|label| normalize(label))
        .filter(|label| !label.is_empty())
        .collect()
}

fn normalized_map(map: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(key, value)| (normalize(key), normalize(value)))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .collect()
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

//
// ─── MAX POINTS ────────────────────────────────────────────────────────────────
//

/// Achievable points for a question.
///
/// The author's point value wins; otherwise the cardinality of the answer
/// key (1 for free-text questions).
#[must_use]
pub fn max_points(question: &Question) -> u32 {
    if let Some(points) = question.points() {
        return points;
    }
    let key = question.correct_answer();
    match question.question_type() {
        QuestionType::MultipleChoice => count(parse_choice_set(key).len()),
        QuestionType::Hotspot | QuestionType::DragAndDrop => count(parse_pairs(key).len()),
        QuestionType::Essay | QuestionType::ShortAnswer => 1,
    }
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Points awarded for `answer`. An answer of the wrong shape scores 0.
#[must_use]
pub fn score(question: &Question, answer: &AnswerValue) -> u32 {
    let max = max_points(question);
    let custom = question.has_custom_points();
    let key = question.correct_answer();

    match (question.question_type(), answer) {
        (QuestionType::MultipleChoice, AnswerValue::ChoiceSet(selected)) => {
            score_choices(&parse_choice_set(key), &normalized_set(selected), custom, max)
        }
        (QuestionType::Hotspot, AnswerValue::LabelMap(given)) => {
            score_labels(&parse_pairs(key), &normalized_map(given), custom, max)
        }
        (QuestionType::DragAndDrop, AnswerValue::ItemZoneMap(given)) => {
            score_placements(&parse_pairs(key), &normalized_map(given), custom, max)
        }
        (QuestionType::Essay | QuestionType::ShortAnswer, AnswerValue::FreeText(text)) => {
            // Non-empty text means "submitted, pending manual grading".
            if text.trim().is_empty() { 0 } else { max }
        }
        _ => 0,
    }
}

/// Score and maximum together.
#[must_use]
pub fn grade(question: &Question, answer: &AnswerValue) -> Grade {
    Grade {
        points: score(question, answer),
        max_points: max_points(question),
    }
}

/// A submitted question that scored below its maximum (or was never scored).
#[must_use]
pub fn is_wrong(question: &Question, score: Option<u32>, submitted: bool) -> bool {
    submitted && score.is_none_or(|points| points < max_points(question))
}

fn score_choices(
    correct: &BTreeSet<String>,
    selected: &BTreeSet<String>,
    custom: bool,
    max: u32,
) -> u32 {
    if correct.is_empty() {
        return 0;
    }
    if custom {
        return if selected == correct { max } else { 0 };
    }
    let hits = count(selected.intersection(correct).count());
    let misses = count(selected.difference(correct).count());
    hits.saturating_sub(misses)
}

fn matching_keys(expected: &BTreeMap<String, String>, given: &BTreeMap<String, String>) -> u32 {
    count(
        expected
            .iter()
            .filter(|(key, value)| given.get(*key) == Some(*value))
            .count(),
    )
}

fn score_labels(
    expected: &BTreeMap<String, String>,
    given: &BTreeMap<String, String>,
    custom: bool,
    max: u32,
) -> u32 {
    if expected.is_empty() {
        return 0;
    }
    let hits = matching_keys(expected, given);
    if custom {
        // Extra labels are not penalised, so every expected label must match.
        return if hits == count(expected.len()) { max } else { 0 };
    }
    hits
}

fn score_placements(
    expected: &BTreeMap<String, String>,
    given: &BTreeMap<String, String>,
    custom: bool,
    max: u32,
) -> u32 {
    if expected.is_empty() {
        return 0;
    }
    if custom {
        return if given == expected { max } else { 0 };
    }
    matching_keys(expected, given)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChoiceOption, QuestionBody, QuestionId};

    fn choice(correct: &str, points: Option<u32>) -> Question {
        let options = ["A", "B", "C", "D"]
            .into_iter()
            .map(|l| ChoiceOption::new(l, format!("option {l}")))
            .collect();
        Question::new(
            QuestionId::new(1),
            "Pick",
            QuestionBody::MultipleChoice { options },
            correct,
        )
        .with_points(points)
    }

    fn hotspot(correct: &str, points: Option<u32>) -> Question {
        Question::new(
            QuestionId::new(2),
            "Label the diagram",
            QuestionBody::Hotspot {
                labels: vec!["X".into(), "Y".into(), "Z".into()],
                values: vec!["a".into(), "b".into(), "c".into()],
            },
            correct,
        )
        .with_points(points)
    }

    fn drag(correct: &str, points: Option<u32>) -> Question {
        Question::new(
            QuestionId::new(3),
            "Sort",
            QuestionBody::DragAndDrop {
                items: vec!["1".into(), "2".into(), "3".into(), "4".into()],
                zones: vec!["odd".into(), "even".into()],
            },
            correct,
        )
        .with_points(points)
    }

    fn labels(items: &[&str]) -> AnswerValue {
        AnswerValue::ChoiceSet(items.iter().map(|s| (*s).to_string()).collect())
    }

    fn pairs(items: &[(&str, &str)]) -> BTreeMap<String, String> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn multiple_choice_partial_credit_with_penalty() {
        let q = choice("A,B", None);
        assert_eq!(max_points(&q), 2);
        assert_eq!(score(&q, &labels(&["A", "B"])), 2);
        assert_eq!(score(&q, &labels(&["A"])), 1);
        assert_eq!(score(&q, &labels(&["A", "C"])), 0);
        assert_eq!(score(&q, &labels(&["C", "D"])), 0);
    }

    #[test]
    fn multiple_choice_custom_points_is_all_or_nothing() {
        let q = choice("A, B", Some(5));
        assert_eq!(max_points(&q), 5);
        assert_eq!(score(&q, &labels(&["B", "A"])), 5);
        assert_eq!(score(&q, &labels(&["A"])), 0);
        assert_eq!(score(&q, &labels(&["A", "B", "C"])), 0);
    }

    #[test]
    fn labels_compare_case_insensitively() {
        let q = choice(" a , b ", None);
        assert_eq!(score(&q, &labels(&["A", "b"])), 2);
    }

    #[test]
    fn hotspot_counts_matching_labels() {
        let q = hotspot("X:a\nY:b\nZ:c", None);
        let answer = AnswerValue::LabelMap(pairs(&[("X", "a"), ("Y", "z")]));
        assert_eq!(max_points(&q), 3);
        assert_eq!(score(&q, &answer), 1);
    }

    #[test]
    fn line_separated_values_keep_their_commas() {
        let q = hotspot("X: Paris, France\nY: Rome", None);
        let answer = AnswerValue::LabelMap(pairs(&[("X", "Paris, France"), ("Y", "Rome")]));
        assert_eq!(max_points(&q), 2);
        assert_eq!(score(&q, &answer), 2);
        assert_eq!(
            parse_pairs("X: Paris, France; Y: Rome").get("x").map(String::as_str),
            Some("paris, france")
        );
        assert_eq!(
            parse_pairs("X: Paris, France").get("x").map(String::as_str),
            Some("paris, france")
        );
        assert_eq!(parse_pairs("1:odd, 2:even").len(), 2);
    }

    #[test]
    fn hotspot_ignores_extra_labels() {
        let q = hotspot("X:a", None);
        let answer = AnswerValue::LabelMap(pairs(&[("X", "a"), ("W", "q")]));
        assert_eq!(score(&q, &answer), 1);
    }

    #[test]
    fn hotspot_custom_points_requires_every_label() {
        let q = hotspot("X:a; Y:b", Some(4));
        let partial = AnswerValue::LabelMap(pairs(&[("X", "a")]));
        let full = AnswerValue::LabelMap(pairs(&[("X", "a"), ("Y", "b")]));
        assert_eq!(score(&q, &partial), 0);
        assert_eq!(score(&q, &full), 4);
    }

    #[test]
    fn drag_and_drop_partial_credit() {
        let q = drag("1:odd, 2:even, 3:odd, 4:even", None);
        let answer = AnswerValue::ItemZoneMap(pairs(&[
            ("1", "odd"),
            ("2", "even"),
            ("3", "odd"),
            ("4", "odd"),
        ]));
        assert_eq!(max_points(&q), 4);
        assert_eq!(score(&q, &answer), 3);
    }

    #[test]
    fn drag_and_drop_custom_points_requires_exact_map() {
        let q = drag("1:odd;2:even", Some(10));
        let exact = AnswerValue::ItemZoneMap(pairs(&[("1", "odd"), ("2", "even")]));
        let extra = AnswerValue::ItemZoneMap(pairs(&[("1", "odd"), ("2", "even"), ("3", "odd")]));
        assert_eq!(score(&q, &exact), 10);
        assert_eq!(score(&q, &extra), 0);
    }

    #[test]
    fn free_text_scores_when_non_blank() {
        let q = Question::new(QuestionId::new(4), "Explain", QuestionBody::Essay, "");
        assert_eq!(max_points(&q), 1);
        assert_eq!(score(&q, &AnswerValue::FreeText("because".into())), 1);
        assert_eq!(score(&q, &AnswerValue::FreeText("   ".into())), 0);

        let weighted = q.with_points(Some(8));
        assert_eq!(score(&weighted, &AnswerValue::FreeText("because".into())), 8);
    }

    #[test]
    fn malformed_specs_degrade_to_zero() {
        let q = choice("", None);
        assert_eq!(max_points(&q), 0);
        assert_eq!(score(&q, &labels(&["A"])), 0);

        let h = hotspot("no delimiters here", None);
        assert_eq!(max_points(&h), 0);
        assert_eq!(
            score(&h, &AnswerValue::LabelMap(pairs(&[("no delimiters here", "x")]))),
            0
        );

        let d = drag(":::", Some(3));
        assert_eq!(max_points(&d), 3);
        assert_eq!(score(&d, &AnswerValue::ItemZoneMap(BTreeMap::new())), 0);
    }

    #[test]
    fn wrong_shape_scores_zero() {
        let q = choice("A", None);
        assert_eq!(score(&q, &AnswerValue::FreeText("A".into())), 0);
    }

    #[test]
    fn wrong_answer_detection() {
        let q = choice("A,B", None);
        assert!(is_wrong(&q, Some(1), true));
        assert!(is_wrong(&q, None, true));
        assert!(!is_wrong(&q, Some(2), true));
        assert!(!is_wrong(&q, None, false));
    }

    #[test]
    fn grade_reports_full_marks() {
        let q = choice("A", None);
        assert!(grade(&q, &labels(&["A"])).is_full());
        assert!(!grade(&choice("", None), &labels(&[])).is_full());
    }
}
