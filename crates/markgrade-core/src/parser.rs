//! Answer-key text parser.
//!
//! Turns the raw text of an answer-key document into an ordered
//! [`AnswerKey`]. Entries look like `1. A`, `2) b` or `10.C`.

use std::ops::RangeInclusive;

use regex::Regex;

use crate::error::GradingError;
use crate::model::{AnswerKey, Choice, ChoiceAlphabet};

/// Compiled answer pattern for one choice alphabet.
#[derive(Debug, Clone)]
pub struct KeyParser {
    pattern: Regex,
    alphabet: ChoiceAlphabet,
}

/// Result of scanning a document for answers.
///
/// An empty key is a parse failure; the parser reports it here instead of
/// returning an error so callers can decide how to surface it.
#[derive(Debug, Clone)]
pub struct KeyParse {
    /// The parsed key, sorted by question number.
    pub key: AnswerKey,
    /// Question numbers that appeared more than once. The first occurrence
    /// in the text was kept.
    pub duplicates: Vec<u32>,
    /// Runs of question numbers missing between 1 and the highest number.
    pub gaps: Vec<RangeInclusive<u32>>,
}

impl KeyParse {
    /// `true` when no answers were found.
    pub fn is_failure(&self) -> bool {
        self.key.is_empty()
    }

    /// Convert into the key, or a `ParseFailure` when nothing matched.
    pub fn into_key(self, source_name: &str) -> Result<AnswerKey, GradingError> {
        if self.is_failure() {
            return Err(GradingError::ParseFailure {
                source_name: source_name.to_string(),
                reason: "no numbered answers (e.g. \"1. A\") found in the document text".into(),
            });
        }
        Ok(self.key)
    }
}

impl KeyParser {
    pub fn new(alphabet: &ChoiceAlphabet) -> Self {
        let letters: String = alphabet.choices().iter().map(|c| c.as_char()).collect();
        // Letters are validated ASCII, so the class is always well formed.
        let pattern = Regex::new(&format!(r"\b([0-9]+)[.)]\s*(?i:([{letters}]))"))
            .expect("alphabet letters always form a valid character class");
        Self {
            pattern,
            alphabet: alphabet.clone(),
        }
    }

    pub fn alphabet(&self) -> &ChoiceAlphabet {
        &self.alphabet
    }

    /// Scan `text` for numbered answers.
    pub fn parse(&self, text: &str) -> KeyParse {
        let mut matches: Vec<(u32, Choice)> = Vec::new();

        for caps in self.pattern.captures_iter(text) {
            let number = &caps[1];
            let Ok(question) = number.parse::<u32>() else {
                tracing::debug!("skipping out-of-range question number {number}");
                continue;
            };
            let Some(choice) = caps[2].chars().next().and_then(Choice::new) else {
                continue;
            };
            matches.push((question, choice));
        }

        // Stable: equal question numbers keep their text order.
        matches.sort_by_key(|&(question, _)| question);

        let mut entries: Vec<(u32, Choice)> = Vec::with_capacity(matches.len());
        let mut duplicates = Vec::new();
        for (question, choice) in matches {
            if entries.last().is_some_and(|&(last, _)| last == question) {
                if duplicates.last() != Some(&question) {
                    duplicates.push(question);
                }
                continue;
            }
            entries.push((question, choice));
        }

        let gaps = find_gaps(&entries);

        KeyParse {
            key: AnswerKey::from_numbered(entries),
            duplicates,
            gaps,
        }
    }
}

impl Default for KeyParser {
    fn default() -> Self {
        Self::new(&ChoiceAlphabet::default())
    }
}

/// Parse `text` with the given alphabet.
pub fn parse_answer_key(text: &str, alphabet: &ChoiceAlphabet) -> KeyParse {
    KeyParser::new(alphabet).parse(text)
}

fn find_gaps(entries: &[(u32, Choice)]) -> Vec<RangeInclusive<u32>> {
    let mut gaps = Vec::new();
    let mut expected = 1u32;
    for &(question, _) in entries {
        if question > expected {
            gaps.push(expected..=question - 1);
        }
        expected = expected.max(question.saturating_add(1));
    }
    gaps
}

/// A warning about a parsed answer key.
#[derive(Debug, Clone)]
pub struct ParseWarning {
    /// The question number (if applicable).
    pub question: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Check a parsed key for common problems.
pub fn validate_key_parse(
    parse: &KeyParse,
    expected_questions: Option<usize>,
) -> Vec<ParseWarning> {
    let mut warnings = Vec::new();

    if parse.is_failure() {
        warnings.push(ParseWarning {
            question: None,
            message: "no answers found".into(),
        });
        return warnings;
    }

    for &question in &parse.duplicates {
        warnings.push(ParseWarning {
            question: Some(question),
            message: format!("question {question} listed more than once, first answer kept"),
        });
    }

    for gap in &parse.gaps {
        let message = if gap.start() == gap.end() {
            format!("question {} is missing", gap.start())
        } else {
            format!("questions {}-{} are missing", gap.start(), gap.end())
        };
        warnings.push(ParseWarning {
            question: Some(*gap.start()),
            message,
        });
    }

    if let Some(expected) = expected_questions {
        if parse.key.len() != expected {
            warnings.push(ParseWarning {
                question: None,
                message: format!("found {} answers, expected {expected}", parse.key.len()),
            });
        }
    }

    warnings
}
