//! Core data model types for markgrade.
//!
//! These are the types shared by the parser, the grader, the result store
//! and the exporters.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GradingError;

/// A single choice symbol on an answer sheet, always an uppercase ASCII letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Choice(char);

impl Choice {
    /// Build a choice from a letter, uppercasing it. Returns `None` for
    /// anything that is not an ASCII letter.
    pub fn new(letter: char) -> Option<Self> {
        letter
            .is_ascii_alphabetic()
            .then(|| Choice(letter.to_ascii_uppercase()))
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl TryFrom<char> for Choice {
    type Error = String;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Choice::new(value).ok_or_else(|| format!("not a choice letter: '{value}'"))
    }
}

impl From<Choice> for char {
    fn from(choice: Choice) -> Self {
        choice.0
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Choice::try_from(c),
            _ => Err(format!("expected a single choice letter, got '{s}'")),
        }
    }
}

/// The set of letters an answer key may use (e.g. `ABCD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChoiceAlphabet {
    letters: Vec<Choice>,
}

impl ChoiceAlphabet {
    /// Parse an alphabet such as `"ABCD"`. Letters are uppercased; the
    /// alphabet must be non-empty and free of duplicates.
    pub fn new(letters: &str) -> Result<Self, String> {
        let mut parsed: Vec<Choice> = Vec::new();
        for c in letters.chars().filter(|c| !c.is_whitespace()) {
            let choice = Choice::try_from(c)?;
            if parsed.contains(&choice) {
                return Err(format!("duplicate letter '{choice}' in alphabet"));
            }
            parsed.push(choice);
        }
        if parsed.is_empty() {
            return Err("alphabet must contain at least one letter".into());
        }
        Ok(Self { letters: parsed })
    }

    pub fn choices(&self) -> &[Choice] {
        &self.letters
    }

    pub fn contains(&self, choice: Choice) -> bool {
        self.letters.contains(&choice)
    }
}

impl Default for ChoiceAlphabet {
    fn default() -> Self {
        Self {
            letters: "ABCD".chars().filter_map(Choice::new).collect(),
        }
    }
}

impl fmt::Display for ChoiceAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.letters {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromStr for ChoiceAlphabet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChoiceAlphabet::new(s)
    }
}

impl TryFrom<String> for ChoiceAlphabet {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ChoiceAlphabet::new(&value)
    }
}

impl From<ChoiceAlphabet> for String {
    fn from(alphabet: ChoiceAlphabet) -> Self {
        alphabet.to_string()
    }
}

/// The authoritative ordered list of correct choices.
///
/// Answers are stored in ascending question-number order; `question_numbers`
/// keeps the numbers they were parsed from so gaps remain visible.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerKey {
    answers: Vec<Choice>,
    question_numbers: Vec<u32>,
}

impl AnswerKey {
    /// Build a key from answers numbered 1..=N.
    pub fn from_answers(answers: Vec<Choice>) -> Self {
        let question_numbers = (1..=answers.len() as u32).collect();
        Self {
            answers,
            question_numbers,
        }
    }

    /// Build a key from `(question_number, choice)` pairs already sorted by
    /// number and free of duplicates.
    pub(crate) fn from_numbered(entries: Vec<(u32, Choice)>) -> Self {
        let (question_numbers, answers) = entries.into_iter().unzip();
        Self {
            answers,
            question_numbers,
        }
    }

    pub fn answers(&self) -> &[Choice] {
        &self.answers
    }

    pub fn question_numbers(&self) -> &[u32] {
        &self.question_numbers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Answer for a 1-based position in the key.
    pub fn get(&self, index: usize) -> Option<Choice> {
        index.checked_sub(1).and_then(|i| self.answers.get(i).copied())
    }

    /// The key as a compact string, e.g. `"ABCD"`.
    pub fn to_letters(&self) -> String {
        self.answers.iter().map(|c| c.as_char()).collect()
    }
}

/// Answers read from a student submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedAnswers {
    /// Answers in question order.
    pub answers: Vec<Choice>,
    /// Question number of each answer. Empty means the answers are
    /// positional and graded against the key in order.
    #[serde(default)]
    pub question_numbers: Vec<u32>,
    /// `true` when these answers are a stand-in and not real recognition.
    pub placeholder: bool,
}

impl DetectedAnswers {
    /// Answers with no question numbers attached.
    pub fn positional(answers: Vec<Choice>, placeholder: bool) -> Self {
        Self {
            answers,
            question_numbers: Vec::new(),
            placeholder,
        }
    }

    /// Answers read alongside the question numbers they were printed with.
    pub fn numbered(question_numbers: Vec<u32>, answers: Vec<Choice>) -> Self {
        Self {
            answers,
            question_numbers,
            placeholder: false,
        }
    }

    /// Answer given for `question`, if the submission carries numbers.
    pub fn answer_for(&self, question: u32) -> Option<Choice> {
        self.question_numbers
            .iter()
            .position(|&q| q == question)
            .and_then(|i| self.answers.get(i).copied())
    }
}

/// The outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Display name of the student.
    pub name: String,
    /// Number of correct answers.
    pub score: u32,
    /// Number of questions in the key.
    pub total: u32,
    /// Question numbers answered correctly.
    pub correct: BTreeSet<u32>,
    /// Question numbers answered incorrectly.
    pub incorrect: BTreeSet<u32>,
    /// Whether the student answers came from the placeholder detector.
    #[serde(default)]
    pub placeholder_answers: bool,
    /// When the submission was graded.
    pub graded_at: DateTime<Utc>,
}

impl GradingResult {
    /// Score as a percentage of the total, 0.0 for an empty key.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.score as f64 / self.total as f64 * 100.0
        }
    }
}

/// File formats markgrade accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
    Image,
}

impl DocumentFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, GradingError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" => Ok(DocumentFormat::Text),
            "jpg" | "jpeg" | "png" => Ok(DocumentFormat::Image),
            _ => Err(GradingError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    /// Whether an answer key may be read from this format.
    pub fn is_document(self) -> bool {
        !matches!(self, DocumentFormat::Image)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Docx => write!(f, "docx"),
            DocumentFormat::Text => write!(f, "txt"),
            DocumentFormat::Image => write!(f, "image"),
        }
    }
}
