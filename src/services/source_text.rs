use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Cleaned source text must be longer than this many characters.
pub const MIN_SOURCE_LENGTH: usize = 50;

static REPEATED_WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s\s+").expect("REPEATED_WHITESPACE is a valid regex pattern")
});
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("BLANK_LINES is a valid regex pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningOptions {
    pub fix_spacing: bool,
    /// Literal phrases removed case-insensitively.
    pub keywords_to_remove: Vec<String>,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            fix_spacing: true,
            keywords_to_remove: Vec::new(),
        }
    }
}

/// Splits a comma separated keyword list, dropping blanks.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins extracted document texts ahead of the manual notes and applies the
/// requested cleanup.
pub fn prepare_source_text(documents: &[String], notes: &str, options: &CleaningOptions) -> String {
    let mut combined = format!("{}\n\n{}", documents.join("\n\n"), notes)
        .trim()
        .to_string();

    if options.fix_spacing {
        combined = REPEATED_WHITESPACE.replace_all(&combined, " ").into_owned();
        combined = BLANK_LINES.replace_all(&combined, "\n").into_owned();
    }

    for keyword in options.keywords_to_remove.iter().map(|k| k.trim()).filter(|k| !k.is_empty()) {
        match RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => combined = pattern.replace_all(&combined, "").into_owned(),
            Err(e) => log::warn!("Ignoring keyword '{}': {}", keyword, e),
        }
    }

    combined.trim().to_string()
}

pub fn has_enough_content(text: &str) -> bool {
    text.chars().count() > MIN_SOURCE_LENGTH
}
