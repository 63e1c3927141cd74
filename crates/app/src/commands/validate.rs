//! The `exam validate` command.

use std::path::Path;

use anyhow::{Context, Result};
use exam_core::scoring;
use storage::bank::QuestionBank;

pub fn execute(bank: &Path) -> Result<()> {
    let questions = QuestionBank::from_path(bank)
        .with_context(|| format!("loading question bank {}", bank.display()))?;

    let mut total_points = 0;
    for question in &questions {
        let max = scoring::max_points(question);
        total_points += max;
        let custom = if question.has_custom_points() { " (custom)" } else { "" };
        println!(
            "  [{}] {:<15} {max:>3} pt{custom}  {}",
            question.id(),
            question.question_type().as_str(),
            question.text()
        );
        if max == 0 {
            println!("      WARNING: correct answer yields no points");
        }
    }

    println!(
        "{} question(s), {total_points} point(s) available.",
        questions.len()
    );
    Ok(())
}
