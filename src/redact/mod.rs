//! Heuristic PII redaction
//!
//! A best-effort pass over extracted text that replaces emails, phone
//! numbers, URLs, social-profile links, and a leading name line with
//! bracketed tokens. This is heuristic scrubbing of free text, not
//! certified document sanitization.

mod rules;

pub use rules::{looks_like_name_line, pattern_rules, PiiKind, Rule};

use serde::Serialize;

/// Per-category counts for one redaction pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionSummary {
    pub emails: usize,
    pub phone_numbers: usize,
    pub urls: usize,
    pub social_profiles: usize,
    pub name_lines: usize,
}

impl RedactionSummary {
    /// Total number of replacements across all categories
    pub fn total(&self) -> usize {
        self.emails + self.phone_numbers + self.urls + self.social_profiles + self.name_lines
    }

    fn record(&mut self, kind: PiiKind, count: usize) {
        match kind {
            PiiKind::Email => self.emails += count,
            PiiKind::Phone => self.phone_numbers += count,
            PiiKind::Url => self.urls += count,
            PiiKind::SocialProfile => self.social_profiles += count,
            PiiKind::NameLine => self.name_lines += count,
        }
    }
}

/// Redact PII from text, returning the cleaned text and what was replaced.
pub fn redact_text(text: &str) -> (String, RedactionSummary) {
    let mut summary = RedactionSummary::default();

    // The name-line guess runs first, against the original first line,
    // before pattern tokens can distort it.
    let mut cleaned = redact_leading_name(text, &mut summary);

    for rule in pattern_rules() {
        let count = rule.pattern.find_iter(&cleaned).count();
        if count > 0 {
            cleaned = rule
                .pattern
                .replace_all(&cleaned, rule.kind.token())
                .into_owned();
            summary.record(rule.kind, count);
        }
    }

    (cleaned, summary)
}

/// Replace the first non-empty line with [NAME] when it looks like a
/// personal name.
fn redact_leading_name(text: &str, summary: &mut RedactionSummary) -> String {
    let Some(first_line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return text.to_string();
    };

    if !looks_like_name_line(first_line) {
        return text.to_string();
    }

    summary.record(PiiKind::NameLine, 1);
    // Replace only the first occurrence, preserving everything else
    text.replacen(first_line, PiiKind::NameLine.token(), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn redacts_emails() {
        let (text, summary) = redact_text("Contact: jane.doe@example.com for details");
        assert_eq!(text, "Contact: [EMAIL] for details");
        assert_eq!(summary.emails, 1);
        assert_eq!(summary.total(), 1);
    }

    #[test]
    fn redacts_phone_numbers() {
        let (text, summary) = redact_text("Call (555) 234-5678 or 555-987-6543 today");
        assert_eq!(text, "Call [PHONE] or [PHONE] today");
        assert_eq!(summary.phone_numbers, 2);
    }

    #[test]
    fn redacts_urls() {
        let (text, summary) = redact_text("See https://example.com/docs and www.example.org");
        assert_eq!(text, "See [URL] and [URL]");
        assert_eq!(summary.urls, 2);
    }

    #[test]
    fn social_links_win_over_generic_urls() {
        let (text, summary) =
            redact_text("Profiles: https://linkedin.com/in/jane-doe and https://example.com");
        assert_eq!(text, "Profiles: [SOCIAL] and [URL]");
        assert_eq!(summary.social_profiles, 1);
        assert_eq!(summary.urls, 1);
    }

    #[test]
    fn redacts_leading_name_line() {
        let input = "Jane Doe\nSoftware Engineer\njane@example.com";
        let (text, summary) = redact_text(input);
        assert_eq!(text, "[NAME]\nSoftware Engineer\n[EMAIL]");
        assert_eq!(summary.name_lines, 1);
        assert_eq!(summary.emails, 1);
    }

    #[test]
    fn leading_heading_is_not_a_name() {
        let input = "Curriculum Vitae\nJane Doe";
        let (text, summary) = redact_text(input);
        assert_eq!(text, input);
        assert_eq!(summary.name_lines, 0);
    }

    #[test]
    fn name_check_skips_blank_leading_lines() {
        let input = "\n\nJane Doe\nEngineer";
        let (text, summary) = redact_text(input);
        assert_eq!(text, "\n\n[NAME]\nEngineer");
        assert_eq!(summary.name_lines, 1);
    }

    #[test]
    fn mixed_document_counts_everything() {
        let input = "John Smith\nEmail: john@corp.io\nPhone: 555-123-4567\n\
                     Web: www.corp.io\nGitHub: github.com/jsmith";
        let (text, summary) = redact_text(input);
        assert!(text.contains("[NAME]"));
        assert!(text.contains("[EMAIL]"));
        assert!(text.contains("[PHONE]"));
        assert!(text.contains("[URL]"));
        assert!(text.contains("[SOCIAL]"));
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn untouched_text_reports_empty_summary() {
        let input = "An ordinary paragraph about nothing in particular.";
        let (text, summary) = redact_text(input);
        assert_eq!(text, input);
        assert_eq!(summary, RedactionSummary::default());
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn empty_input() {
        let (text, summary) = redact_text("");
        assert_eq!(text, "");
        assert_eq!(summary.total(), 0);
    }
}
