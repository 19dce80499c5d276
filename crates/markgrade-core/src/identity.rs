//! Student identity resolution.
//!
//! A submission's display name comes from OCR text when there is enough of
//! it, otherwise from an ordered list of filename matchers, otherwise from a
//! sanitized version of the filename itself.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// Prefix for identifiers derived from filename patterns.
pub const STUDENT_PREFIX: &str = "Student_";

/// Returned when nothing usable can be derived.
pub const UNKNOWN_STUDENT: &str = "Student_Unknown";

/// Maximum length, in characters, of a filename-derived identity.
pub const MAX_IDENTITY_CHARS: usize = 20;

/// Minimum trimmed OCR text length accepted as a name.
pub const DEFAULT_MIN_OCR_CHARS: usize = 2;

/// Filename tokens left behind by messaging-app exports.
const MARKER_TOKENS: [&str; 3] = ["whatsapp", "wa", "img"];

/// A single filename heuristic.
pub trait IdentityMatcher: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Derive an identity from a filename stem, or `None` if the heuristic
    /// does not apply.
    fn identify(&self, stem: &str) -> Option<String>;
}

/// An [`IdentityMatcher`] backed by a plain function.
pub struct FnMatcher {
    name: &'static str,
    func: fn(&str) -> Option<String>,
}

impl FnMatcher {
    pub const fn new(name: &'static str, func: fn(&str) -> Option<String>) -> Self {
        Self { name, func }
    }
}

impl IdentityMatcher for FnMatcher {
    fn name(&self) -> &str {
        self.name
    }

    fn identify(&self, stem: &str) -> Option<String> {
        (self.func)(stem)
    }
}

/// The built-in matchers, in priority order.
pub fn default_matchers() -> Vec<Box<dyn IdentityMatcher>> {
    vec![
        Box::new(FnMatcher::new("messaging-time", messaging_time)),
        Box::new(FnMatcher::new("messaging-trailing-id", messaging_trailing_id)),
        Box::new(FnMatcher::new("messaging-last-segment", messaging_last_segment)),
    ]
}

/// Resolves a display name for a submission.
pub struct IdentityResolver {
    matchers: Vec<Box<dyn IdentityMatcher>>,
    min_ocr_chars: usize,
}

impl IdentityResolver {
    pub fn new(min_ocr_chars: usize) -> Self {
        Self {
            matchers: default_matchers(),
            min_ocr_chars,
        }
    }

    /// Append a matcher; it runs after the existing ones.
    pub fn with_matcher(mut self, matcher: impl IdentityMatcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Resolve the identity for `path`. Never returns an empty string.
    pub fn resolve(&self, path: &Path, ocr_text: Option<&str>) -> String {
        if let Some(text) = ocr_text.map(str::trim) {
            if text.chars().count() >= self.min_ocr_chars {
                return text.to_string();
            }
            tracing::debug!("OCR text too short ({text:?}), using filename");
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.resolve_stem(&stem)
    }

    /// Resolve from a filename stem (no directory, no extension).
    pub fn resolve_stem(&self, stem: &str) -> String {
        for matcher in &self.matchers {
            if let Some(identity) = matcher.identify(stem).filter(|id| !id.is_empty()) {
                tracing::debug!(matcher = matcher.name(), "resolved {stem:?} to {identity:?}");
                return identity;
            }
        }

        let clean = sanitize_stem(stem);
        if clean.is_empty() {
            UNKNOWN_STUDENT.to_string()
        } else {
            clean
        }
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_OCR_CHARS)
    }
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.matchers.iter().map(|m| m.name()).collect();
        f.debug_struct("IdentityResolver")
            .field("matchers", &names)
            .field("min_ocr_chars", &self.min_ocr_chars)
            .finish()
    }
}

/// Replace everything except ASCII letters, digits and CJK ideographs with
/// `_`, collapse repeats, trim `_` from both ends and cut to 20 characters.
pub fn sanitize_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fff}').contains(&c) {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    truncate_chars(out.trim_matches('_'), MAX_IDENTITY_CHARS)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn prefixed(suffix: &str) -> String {
    truncate_chars(&format!("{STUDENT_PREFIX}{suffix}"), MAX_IDENTITY_CHARS)
}

fn has_marker(stem: &str) -> bool {
    let lower = stem.to_lowercase();
    MARKER_TOKENS.iter().any(|token| lower.contains(token))
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[0-9]{2}\.[0-9]{2}\.[0-9]{2}").expect("time pattern is a valid regex")
    })
}

fn trailing_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:whatsapp|wa|img)[-_ ]?([0-9]+)$")
            .expect("trailing id pattern is a valid regex")
    })
}

/// `WhatsApp Image 2023-07-07 at 08.01.01` → `Student_080101`.
fn messaging_time(stem: &str) -> Option<String> {
    if !has_marker(stem) {
        return None;
    }
    let found = time_pattern().find(stem)?;
    let digits: String = found.as_str().chars().filter(char::is_ascii_digit).collect();
    Some(prefixed(&digits))
}

/// `IMG-20230707-WA0001` → `Student_0001`.
fn messaging_trailing_id(stem: &str) -> Option<String> {
    if !has_marker(stem) {
        return None;
    }
    let caps = trailing_id_pattern().captures(stem)?;
    Some(prefixed(&caps[1]))
}

/// `WhatsApp_scan_abcdefghij` → `Student_abcdefgh`.
fn messaging_last_segment(stem: &str) -> Option<String> {
    if !has_marker(stem) {
        return None;
    }
    let (_, last) = stem.rsplit_once('_')?;
    if last.is_empty() {
        return None;
    }
    Some(prefixed(&truncate_chars(last, 8)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(path: &str) -> String {
        IdentityResolver::default().resolve(Path::new(path), None)
    }

    #[test]
    fn ocr_text_wins_when_long_enough() {
        let resolver = IdentityResolver::default();
        let name =
            resolver.resolve(Path::new("IMG-20230707-WA0001.jpg"), Some("  Siti Aminah \n"));
        assert_eq!(name, "Siti Aminah");
    }

    #[test]
    fn ocr_text_at_the_threshold_is_accepted() {
        let resolver = IdentityResolver::default();
        let path = Path::new("IMG-20230707-WA0001.jpg");
        assert_eq!(resolver.resolve(path, Some(" Al ")), "Al");
        assert_eq!(resolver.resolve(path, Some("张三")), "张三");
    }

    #[test]
    fn short_ocr_text_falls_back_to_filename() {
        let resolver = IdentityResolver::default();
        assert_eq!(
            resolver.resolve(Path::new("IMG-20230707-WA0001.jpg"), Some(" x ")),
            "Student_0001"
        );
        assert_eq!(
            resolver.resolve(Path::new("IMG-20230707-WA0001.jpg"), Some("")),
            "Student_0001"
        );
    }

    #[test]
    fn whatsapp_time_pattern() {
        assert_eq!(
            resolve("/tmp/uploads/WhatsApp Image 2023-07-07 at 08.01.01.jpeg"),
            "Student_080101"
        );
    }

    #[test]
    fn whatsapp_trailing_id() {
        assert_eq!(resolve("IMG-20230707-WA0001.jpg"), "Student_0001");
        assert_eq!(resolve("img_42.png"), "Student_42");
    }

    #[test]
    fn whatsapp_last_underscore_segment() {
        assert_eq!(resolve("whatsapp_scan_abcdefghijk.jpg"), "Student_abcdefgh");
    }

    #[test]
    fn plain_filenames_are_sanitized() {
        assert_eq!(resolve("Budi Santoso (kelas 5).png"), "Budi_Santoso_kelas_5");
        assert_eq!(resolve("张三-答题卡.jpg"), "张三_答题卡");
        assert_eq!(resolve("__abc__def__.jpg"), "abc_def");
    }

    #[test]
    fn sanitized_name_is_truncated() {
        let name = resolve("a-very-long-student-filename-here.jpg");
        assert_eq!(name, "a_very_long_student_");
        assert_eq!(name.chars().count(), MAX_IDENTITY_CHARS);
    }

    #[test]
    fn empty_result_uses_sentinel() {
        assert_eq!(resolve("---.jpg"), UNKNOWN_STUDENT);
        assert_eq!(resolve(""), UNKNOWN_STUDENT);
        assert_eq!(resolve("/"), UNKNOWN_STUDENT);
    }

    #[test]
    fn resolution_is_total_and_bounded() {
        let inputs = [
            "",
            ".",
            "..",
            "IMG.jpg",
            "wa",
            "WA_.png",
            "WhatsApp Image 2024-01-01 at 99.99.99 (2).jpeg",
            "IMG_12345678901234567890123.jpg",
            "résumé élève.png",
            "名字名字名字名字名字名字名字名字名字名字名字名字.jpg",
            "   ",
            "scan#001!!.pdf",
        ];
        for input in inputs {
            let id = resolve(input);
            assert!(!id.is_empty(), "empty identity for {input:?}");
            assert!(
                id.chars().count() <= MAX_IDENTITY_CHARS || id == UNKNOWN_STUDENT,
                "identity {id:?} for {input:?} is too long"
            );
        }
    }

    #[test]
    fn custom_matcher_runs_after_defaults() {
        fn roll_number(stem: &str) -> Option<String> {
            stem.strip_prefix("roll-").map(|n| format!("Roll {n}"))
        }
        let resolver =
            IdentityResolver::default().with_matcher(FnMatcher::new("roll", roll_number));
        assert_eq!(resolver.resolve(Path::new("roll-17.jpg"), None), "Roll 17");
        assert_eq!(
            resolver.resolve(Path::new("IMG-20230707-WA0001.jpg"), None),
            "Student_0001"
        );
    }
}
