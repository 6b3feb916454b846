use crate::parser::sections::Heading;

const STOPWORDS: &[&str] = &["the", "and", "for", "with", "of", "a", "an", "to", "in", "on"];

/// Knobs for the heading-similarity predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Only headings with the same marker count can match.
    pub require_same_level: bool,
    pub case_sensitive: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            require_same_level: true,
            case_sensitive: false,
        }
    }
}

impl MatchOptions {
    fn fold(&self, s: &str) -> String {
        if self.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    }

    fn levels_compatible(&self, template: &Heading, current: &Heading) -> bool {
        !self.require_same_level || template.level == current.level
    }
}

/// The word of a template title that a current heading must contain.
///
/// First word (edges stripped of punctuation) that is at least three
/// characters and not a stopword, falling back to the first word that has
/// any alphanumeric content. `None` when the title has no such word.
pub fn significant_token(title: &str) -> Option<&str> {
    let words: Vec<&str> = title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect();

    words
        .iter()
        .find(|w| w.chars().count() >= 3 && !STOPWORDS.contains(&w.to_lowercase().as_str()))
        .or_else(|| words.first())
        .copied()
}

/// Exact comparison used before the loose pass: titles equal after trimming
/// (and case folding unless case-sensitive).
pub fn titles_equal(template: &Heading, current: &Heading, options: &MatchOptions) -> bool {
    options.levels_compatible(template, current)
        && options.fold(template.title.trim()) == options.fold(current.title.trim())
}

/// Heading-similarity predicate: does `current` satisfy the template section
/// headed by `template`?
pub fn headings_match(template: &Heading, current: &Heading, options: &MatchOptions) -> bool {
    if !options.levels_compatible(template, current) {
        return false;
    }
    match significant_token(&template.title) {
        Some(token) => options.fold(&current.title).contains(&options.fold(token)),
        None => titles_equal(template, current, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(level: usize, title: &str) -> Heading {
        Heading {
            level,
            title: title.to_string(),
        }
    }

    #[test]
    fn token_is_first_significant_word() {
        assert_eq!(significant_token("Overview"), Some("Overview"));
        assert_eq!(significant_token("Key Features"), Some("Key"));
        assert_eq!(significant_token("Protocol / Phases"), Some("Protocol"));
        assert_eq!(significant_token("Phase 0: Initialize"), Some("Phase"));
        assert_eq!(significant_token("Anti-Patterns Prevented"), Some("Anti-Patterns"));
    }

    #[test]
    fn token_skips_stopwords_and_short_words() {
        assert_eq!(significant_token("The Rules"), Some("Rules"));
        assert_eq!(significant_token("A to Z of Testing"), Some("Testing"));
        assert_eq!(significant_token("Q & A"), Some("Q"));
    }

    #[test]
    fn token_strips_edge_punctuation() {
        assert_eq!(significant_token("`mdmerge` usage"), Some("mdmerge"));
        assert_eq!(significant_token("(Optional) Notes"), Some("Optional"));
    }

    #[test]
    fn no_token_for_punctuation_titles() {
        assert_eq!(significant_token("---"), None);
        assert_eq!(significant_token(""), None);
    }

    #[test]
    fn exact_heading_matches() {
        let opts = MatchOptions::default();
        assert!(headings_match(&h(2, "Overview"), &h(2, "Overview"), &opts));
    }

    #[test]
    fn wording_drift_still_matches() {
        let opts = MatchOptions::default();
        assert!(headings_match(&h(2, "Key Features"), &h(2, "Key Capabilities"), &opts));
        assert!(headings_match(&h(2, "Usage"), &h(2, "Basic usage"), &opts));
        assert!(headings_match(&h(2, "Success Metrics"), &h(2, "How we measure success"), &opts));
    }

    #[test]
    fn unrelated_heading_does_not_match() {
        let opts = MatchOptions::default();
        assert!(!headings_match(&h(2, "Key Features"), &h(2, "Highlights"), &opts));
    }

    #[test]
    fn level_must_agree_by_default() {
        let opts = MatchOptions::default();
        assert!(!headings_match(&h(2, "Overview"), &h(3, "Overview"), &opts));

        let any_level = MatchOptions {
            require_same_level: false,
            ..opts
        };
        assert!(headings_match(&h(2, "Overview"), &h(3, "Overview"), &any_level));
    }

    #[test]
    fn case_sensitivity() {
        let opts = MatchOptions::default();
        assert!(headings_match(&h(2, "Overview"), &h(2, "OVERVIEW"), &opts));

        let strict = MatchOptions {
            case_sensitive: true,
            ..opts
        };
        assert!(!headings_match(&h(2, "Overview"), &h(2, "OVERVIEW"), &strict));
        assert!(!titles_equal(&h(2, "Overview"), &h(2, "overview"), &strict));
    }

    #[test]
    fn tokenless_title_needs_exact_equality() {
        let opts = MatchOptions::default();
        assert!(headings_match(&h(2, "***"), &h(2, "***"), &opts));
        assert!(!headings_match(&h(2, "***"), &h(2, "*** extra"), &opts));
    }

    #[test]
    fn shared_first_token_is_ambiguous() {
        // Loose matching alone cannot tell phases apart; the merger's exact
        // pass handles that.
        let opts = MatchOptions::default();
        assert!(headings_match(&h(3, "Phase 0: Initialize"), &h(3, "Phase 2: Strategy"), &opts));
    }
}
