use crate::models::question::{QuestionOption, QuestionType};
use std::collections::BTreeSet;

pub struct GradingService;

impl GradingService {
    /// Indices of the correct options, ascending.
    pub fn correct_indices(options: &[QuestionOption]) -> Vec<usize> {
        options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_correct)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// No partial credit: the selected set must equal the correct set.
    /// Single-answer types additionally require exactly one selection.
    pub fn is_correct(
        question_type: QuestionType,
        options: &[QuestionOption],
        selected: &[usize],
    ) -> bool {
        let selected: BTreeSet<usize> = selected.iter().copied().collect();
        if question_type.is_single_answer() && selected.len() != 1 {
            return false;
        }
        let correct: BTreeSet<usize> = Self::correct_indices(options).into_iter().collect();
        !correct.is_empty() && selected == correct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(flags: &[bool]) -> Vec<QuestionOption> {
        flags
            .iter()
            .enumerate()
            .map(|(i, c)| QuestionOption {
                text: format!("opción {}", i + 1),
                is_correct: *c,
            })
            .collect()
    }

    #[test]
    fn multiple_choice_requires_exact_set() {
        let opts = options(&[true, false, true, false]);
        assert!(GradingService::is_correct(QuestionType::MultipleChoice, &opts, &[0, 2]));
        assert!(GradingService::is_correct(QuestionType::MultipleChoice, &opts, &[2, 0]));
        assert!(!GradingService::is_correct(QuestionType::MultipleChoice, &opts, &[0]));
        assert!(!GradingService::is_correct(QuestionType::MultipleChoice, &opts, &[0, 1, 2]));
        assert!(!GradingService::is_correct(QuestionType::MultipleChoice, &opts, &[]));
    }

    #[test]
    fn single_choice_takes_one_option() {
        let opts = options(&[false, true, false]);
        assert!(GradingService::is_correct(QuestionType::SingleChoice, &opts, &[1]));
        assert!(!GradingService::is_correct(QuestionType::SingleChoice, &opts, &[0]));
        assert!(!GradingService::is_correct(QuestionType::Tricky, &opts, &[1, 1, 0]));
    }

    #[test]
    fn question_without_correct_option_never_scores() {
        let opts = options(&[false, false]);
        assert!(!GradingService::is_correct(QuestionType::MultipleChoice, &opts, &[]));
    }
}
