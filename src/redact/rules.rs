//! PII pattern definitions
//!
//! Ordering matters: social-profile links must be consumed before the
//! generic URL rule, and URLs before emails, so each match receives the
//! most specific replacement token.

use once_cell::sync::Lazy;
use regex::Regex;

/// Category of personally identifiable information a rule targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PiiKind {
    SocialProfile,
    Url,
    Email,
    Phone,
    NameLine,
}

impl PiiKind {
    /// Replacement token written into the text
    pub fn token(&self) -> &'static str {
        match self {
            PiiKind::SocialProfile => "[SOCIAL]",
            PiiKind::Url => "[URL]",
            PiiKind::Email => "[EMAIL]",
            PiiKind::Phone => "[PHONE]",
            PiiKind::NameLine => "[NAME]",
        }
    }
}

/// A single redaction rule: a PII category and its pattern
pub struct Rule {
    pub kind: PiiKind,
    pub pattern: &'static Regex,
}

static SOCIAL_PROFILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:https?://)?(?:www\.)?(?:linkedin\.com/in/|github\.com/|twitter\.com/|x\.com/|instagram\.com/|facebook\.com/)[A-Za-z0-9_.\-]+/?",
    )
    .expect("social profile pattern")
});

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>()\[\]{}]+").expect("url pattern")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}\b").expect("email pattern")
});

// Optional +country code, optional parenthesized area code, separator-tolerant
// NANP-shaped local number. Word boundaries keep it out of longer digit runs.
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.\-]?)?(?:\(\d{3}\)[\s.\-]?|\b\d{3}[\s.\-])\d{3}[\s.\-]\d{4}\b")
        .expect("phone pattern")
});

/// Pattern rules in application order
pub fn pattern_rules() -> [Rule; 4] {
    [
        Rule {
            kind: PiiKind::SocialProfile,
            pattern: &SOCIAL_PROFILE,
        },
        Rule {
            kind: PiiKind::Url,
            pattern: &URL,
        },
        Rule {
            kind: PiiKind::Email,
            pattern: &EMAIL,
        },
        Rule {
            kind: PiiKind::Phone,
            pattern: &PHONE,
        },
    ]
}

// Headings that frequently open documents and look name-shaped
const HEADING_WORDS: &[&str] = &[
    "resume",
    "curriculum",
    "vitae",
    "invoice",
    "report",
    "statement",
    "summary",
    "profile",
    "confidential",
    "proposal",
    "agreement",
    "contract",
];

/// Best-effort check whether a line looks like a personal name: 2-4
/// capitalized alphabetic words, no digits, short, and not a recognizable
/// document heading.
pub fn looks_like_name_line(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.len() > 48 {
        return false;
    }
    if line.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return false;
    }

    for word in &words {
        if HEADING_WORDS.contains(&word.to_lowercase().trim_end_matches('.')) {
            return false;
        }
        // Capitalized, alphabetic apart from name punctuation
        let mut chars = word.chars();
        match chars.next() {
            Some(first) if first.is_uppercase() => {}
            _ => return false,
        }
        if !chars.all(|c| c.is_alphabetic() || c == '-' || c == '\'' || c == '.') {
            return false;
        }
    }

    true
}
