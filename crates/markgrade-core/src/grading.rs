//! Answer comparison.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::error::GradingError;
use crate::model::{AnswerKey, DetectedAnswers, GradingResult};

/// Compare a submission against the key.
///
/// Lists of different lengths are rejected; a partial list is never zipped
/// against the key. Numbered submissions are matched by question number, so
/// a key question the submission never answered is graded incorrect.
/// Results are reported by the key's question numbers.
pub fn grade(
    name: impl Into<String>,
    key: &AnswerKey,
    submission: &DetectedAnswers,
) -> Result<GradingResult, GradingError> {
    if key.is_empty() {
        return Err(GradingError::ParseFailure {
            source_name: "answer key".into(),
            reason: "refusing to grade against an empty key".into(),
        });
    }
    if submission.answers.len() != key.len() {
        return Err(GradingError::LengthMismatch {
            expected: key.len(),
            found: submission.answers.len(),
        });
    }

    let numbered = !submission.question_numbers.is_empty();
    let mut correct = BTreeSet::new();
    let mut incorrect = BTreeSet::new();
    let questions = key.question_numbers().iter().zip(key.answers());
    for (i, (&question, &expected)) in questions.enumerate() {
        let given = if numbered {
            submission.answer_for(question)
        } else {
            submission.answers.get(i).copied()
        };
        if given == Some(expected) {
            correct.insert(question);
        } else {
            incorrect.insert(question);
        }
    }

    Ok(GradingResult {
        name: name.into(),
        score: correct.len() as u32,
        total: key.len() as u32,
        correct,
        incorrect,
        placeholder_answers: submission.placeholder,
        graded_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Choice;

    fn choices(s: &str) -> Vec<Choice> {
        s.chars().filter_map(Choice::new).collect()
    }

    fn submission(s: &str) -> DetectedAnswers {
        DetectedAnswers::positional(choices(s), false)
    }

    fn numbered(entries: &[(u32, char)]) -> Vec<(u32, Choice)> {
        entries
            .iter()
            .filter_map(|&(q, c)| Choice::new(c).map(|c| (q, c)))
            .collect()
    }

    #[test]
    fn grades_partial_match() {
        let key = AnswerKey::from_answers(choices("ABCD"));
        let result = grade("Ani", &key, &submission("AXCD")).unwrap();

        assert_eq!(result.score, 3);
        assert_eq!(result.total, 4);
        assert_eq!(result.correct, BTreeSet::from([1, 3, 4]));
        assert_eq!(result.incorrect, BTreeSet::from([2]));
        assert!(!result.placeholder_answers);
    }

    #[test]
    fn correct_and_incorrect_partition_all_questions() {
        let key = AnswerKey::from_answers(choices("ABCDABCDAB"));
        let result = grade("x", &key, &submission("ABDDCBCAAB")).unwrap();

        assert!(result.correct.is_disjoint(&result.incorrect));
        let all: BTreeSet<u32> = result.correct.union(&result.incorrect).copied().collect();
        assert_eq!(all, (1..=10).collect());
        assert_eq!(result.score as usize, result.correct.len());
    }

    #[test]
    fn comparison_is_case_normalized() {
        let key = AnswerKey::from_answers(choices("ab"));
        let result = grade("x", &key, &submission("AB")).unwrap();
        assert_eq!(result.score, 2);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let key = AnswerKey::from_answers(choices(&"A".repeat(40)));
        let err = grade("x", &key, &submission(&"A".repeat(10))).unwrap_err();
        assert!(matches!(
            err,
            GradingError::LengthMismatch {
                expected: 40,
                found: 10
            }
        ));
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = grade("x", &AnswerKey::default(), &submission("")).unwrap_err();
        assert!(matches!(err, GradingError::ParseFailure { .. }));
    }

    #[test]
    fn placeholder_flag_is_carried() {
        let key = AnswerKey::from_answers(choices("AB"));
        let detected = DetectedAnswers::positional(choices("AB"), true);
        assert!(grade("x", &key, &detected).unwrap().placeholder_answers);
    }

    #[test]
    fn results_use_key_question_numbers() {
        let key = AnswerKey::from_numbered(numbered(&[(1, 'A'), (2, 'B'), (5, 'C')]));
        let result = grade("x", &key, &submission("ABD")).unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(result.correct, BTreeSet::from([1, 2]));
        assert_eq!(result.incorrect, BTreeSet::from([5]));
    }

    #[test]
    fn numbered_submission_is_matched_by_question() {
        let key = AnswerKey::from_answers(choices("ABC"));
        let detected = DetectedAnswers::numbered(vec![3, 1, 2], choices("CAB"));
        let result = grade("x", &key, &detected).unwrap();
        assert_eq!(result.score, 3);
    }

    #[test]
    fn unanswered_question_is_incorrect_even_when_counts_match() {
        let key = AnswerKey::from_answers(choices("ABC"));
        let detected = DetectedAnswers::numbered(vec![1, 2, 4], choices("ABC"));
        let result = grade("x", &key, &detected).unwrap();

        assert_eq!(result.score, 2);
        assert_eq!(result.correct, BTreeSet::from([1, 2]));
        assert_eq!(result.incorrect, BTreeSet::from([3]));
    }
}
