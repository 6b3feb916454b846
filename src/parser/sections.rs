use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::blocks::Block;

/// Lookup identity of a section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKey {
    /// The document's first line, when it is a level-1 heading.
    Title,
    /// The bold one-line statement under the title.
    Purpose,
    /// Any other heading, keyed by its verbatim line.
    Heading(String),
}

impl SectionKey {
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, SectionKey::Heading(_))
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKey::Title => f.write_str("title"),
            SectionKey::Purpose => f.write_str("purpose"),
            SectionKey::Heading(line) => f.write_str(line),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub level: usize,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub key: SectionKey,
    /// `None` for the synthetic title/purpose sections.
    pub heading: Option<Heading>,
    pub lines: Vec<String>,
    /// 1-based line of the section's first line in the source.
    pub line: usize,
}

impl Section {
    pub fn level(&self) -> Option<usize> {
        self.heading.as_ref().map(|h| h.level)
    }

    pub fn body(&self) -> String {
        self.lines.join("\n")
    }

    /// Body without leading/trailing blank lines.
    pub fn trimmed_body(&self) -> String {
        let start = self.lines.iter().position(|l| !l.trim().is_empty());
        let end = self.lines.iter().rposition(|l| !l.trim().is_empty());
        match (start, end) {
            (Some(start), Some(end)) => self.lines[start..=end].join("\n"),
            _ => String::new(),
        }
    }
}

/// Content the parser could not attach to a retained section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dropped {
    /// A non-blank line before the first heading that is neither title nor purpose.
    PreHeading { line: usize, text: String },
    /// An earlier section overwritten by a later one with identical heading text.
    DuplicateHeading { heading: String, line: usize, body: String },
    /// A section of the current document that no template section claimed.
    UnmatchedSection { heading: String, line: usize },
}

impl fmt::Display for Dropped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dropped::PreHeading { line, text } => {
                write!(f, "line {}: text before first heading: {}", line, text)
            }
            Dropped::DuplicateHeading { heading, line, .. } => {
                write!(f, "line {}: duplicate heading overwritten: {}", line, heading)
            }
            Dropped::UnmatchedSection { heading, line } => {
                write!(f, "line {}: section not in template: {}", line, heading)
            }
        }
    }
}

/// Sections in first-seen order plus a key index.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    sections: Vec<Section>,
    index: HashMap<SectionKey, usize>,
    dropped: Vec<Dropped>,
}

impl ParsedDocument {
    pub fn get(&self, key: &SectionKey) -> Option<&Section> {
        self.index.get(key).map(|&i| &self.sections[i])
    }

    pub fn title(&self) -> Option<&Section> {
        self.get(&SectionKey::Title)
    }

    pub fn purpose(&self) -> Option<&Section> {
        self.get(&SectionKey::Purpose)
    }

    /// All sections, synthetic ones included, in first-seen order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Heading sections only, in first-seen order.
    pub fn headings(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| !s.key.is_synthetic())
    }

    pub fn dropped(&self) -> &[Dropped] {
        &self.dropped
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Later occurrences replace earlier ones but keep the first position.
    fn insert(&mut self, section: Section) {
        match self.index.get(&section.key) {
            Some(&i) => {
                let old = std::mem::replace(&mut self.sections[i], section);
                self.dropped.push(Dropped::DuplicateHeading {
                    heading: old.key.to_string(),
                    line: old.line,
                    body: old.body(),
                });
            }
            None => {
                self.index.insert(section.key.clone(), self.sections.len());
                self.sections.push(section);
            }
        }
    }
}

/// Group classified lines into keyed sections.
pub fn cluster_sections(blocks: &[Block]) -> ParsedDocument {
    let mut doc = ParsedDocument::default();
    let start = take_title_and_purpose(blocks, &mut doc);

    let mut current: Option<Section> = None;
    for (i, block) in blocks.iter().enumerate().skip(start) {
        if let Block::Heading { level, title, raw } = block {
            if let Some(section) = current.take() {
                doc.insert(section);
            }
            current = Some(Section {
                key: SectionKey::Heading(raw.clone()),
                heading: Some(Heading {
                    level: *level,
                    title: title.clone(),
                }),
                lines: vec![raw.clone()],
                line: i + 1,
            });
            continue;
        }

        match current.as_mut() {
            Some(section) => section.lines.push(block.raw().to_string()),
            None if !block.is_empty() => doc.dropped.push(Dropped::PreHeading {
                line: i + 1,
                text: block.raw().to_string(),
            }),
            None => {}
        }
    }

    if let Some(section) = current {
        doc.insert(section);
    }

    doc
}

/// Register `title`/`purpose` when the document opens with a level-1 heading.
/// Returns the index of the first line left to scan.
fn take_title_and_purpose(blocks: &[Block], doc: &mut ParsedDocument) -> usize {
    let Some(Block::Heading { level: 1, raw, .. }) = blocks.first() else {
        return 0;
    };
    doc.insert(Section {
        key: SectionKey::Title,
        heading: None,
        lines: vec![raw.clone()],
        line: 1,
    });

    // Blank lines between title and statement are allowed.
    let next = blocks[1..].iter().position(|b| !b.is_empty()).map(|p| p + 1);
    match next.map(|i| (i, &blocks[i])) {
        Some((i, Block::Strong(line))) => {
            doc.insert(Section {
                key: SectionKey::Purpose,
                heading: None,
                lines: vec![line.clone()],
                line: i + 1,
            });
            i + 1
        }
        _ => {
            doc.insert(Section {
                key: SectionKey::Purpose,
                heading: None,
                lines: Vec::new(),
                line: 2,
            });
            1
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::classify_lines;

    fn parse(md: &str) -> ParsedDocument {
        cluster_sections(&classify_lines(md))
    }

    fn keys(doc: &ParsedDocument) -> Vec<String> {
        doc.sections().iter().map(|s| s.key.to_string()).collect()
    }

    #[test]
    fn title_and_purpose() {
        let doc = parse("# My Game\n**Does X.**\n## Overview\nText");
        assert_eq!(doc.title().unwrap().body(), "# My Game");
        assert_eq!(doc.purpose().unwrap().body(), "**Does X.**");
        assert_eq!(keys(&doc), vec!["title", "purpose", "## Overview"]);
    }

    #[test]
    fn purpose_after_blank_lines() {
        let doc = parse("# My Game\n\n**Does X.**\n\n## Overview\n");
        let purpose = doc.purpose().unwrap();
        assert_eq!(purpose.body(), "**Does X.**");
        assert_eq!(purpose.line, 3);
        assert!(doc.dropped().is_empty());
    }

    #[test]
    fn missing_purpose_is_present_but_empty() {
        let doc = parse("# My Game\n## Overview\nText");
        let purpose = doc.purpose().unwrap();
        assert!(purpose.lines.is_empty());
        assert_eq!(purpose.body(), "");
    }

    #[test]
    fn non_strong_line_after_title_is_dropped() {
        let doc = parse("# My Game\nplain intro\n## Overview\nText");
        assert_eq!(doc.purpose().unwrap().body(), "");
        assert_eq!(
            doc.dropped(),
            &[Dropped::PreHeading {
                line: 2,
                text: "plain intro".into()
            }]
        );
    }

    #[test]
    fn subheading_first_line_is_not_title() {
        let doc = parse("## Overview\nText");
        assert!(doc.title().is_none());
        assert!(doc.purpose().is_none());
        assert_eq!(keys(&doc), vec!["## Overview"]);
    }

    #[test]
    fn section_body_includes_heading_and_raw_lines() {
        let doc = parse("# T\n## Usage\n\n  indented\n\n### Arguments\n- a");
        let usage = doc.get(&SectionKey::Heading("## Usage".into())).unwrap();
        assert_eq!(usage.lines, vec!["## Usage", "", "  indented", ""]);
        assert_eq!(usage.trimmed_body(), "## Usage\n\n  indented");
        assert_eq!(usage.level(), Some(2));
        let args = doc.get(&SectionKey::Heading("### Arguments".into())).unwrap();
        assert_eq!(args.level(), Some(3));
        assert_eq!(args.line, 6);
    }

    #[test]
    fn no_headings_yields_no_sections() {
        let doc = parse("just some text");
        assert!(doc.is_empty());
        assert_eq!(doc.dropped().len(), 1);
    }

    #[test]
    fn empty_document() {
        let doc = parse("");
        assert!(doc.is_empty());
        assert!(doc.dropped().is_empty());
    }

    #[test]
    fn title_only_document() {
        let doc = parse("# Lonely");
        assert_eq!(keys(&doc), vec!["title", "purpose"]);
    }

    #[test]
    fn duplicate_heading_last_wins_first_position() {
        let doc = parse("# T\n## Notes\nfirst\n## Other\nx\n## Notes\nsecond");
        assert_eq!(keys(&doc), vec!["title", "purpose", "## Notes", "## Other"]);
        let notes = doc.get(&SectionKey::Heading("## Notes".into())).unwrap();
        assert_eq!(notes.body(), "## Notes\nsecond");
        assert_eq!(
            doc.dropped(),
            &[Dropped::DuplicateHeading {
                heading: "## Notes".into(),
                line: 2,
                body: "## Notes\nfirst".into(),
            }]
        );
    }

    #[test]
    fn second_level_one_heading_is_ordinary_section() {
        let doc = parse("# T\n**P**\n# Appendix\nmore");
        assert!(doc.get(&SectionKey::Heading("# Appendix".into())).is_some());
        assert_eq!(doc.headings().count(), 1);
    }

    #[test]
    fn my_game_fixture() {
        let md = std::fs::read_to_string("tests/fixtures/my_game.md").unwrap();
        let doc = parse(&md);
        assert_eq!(doc.title().unwrap().body(), "# My Game");
        assert_eq!(doc.purpose().unwrap().body(), "**Does X.**");
        assert_eq!(doc.headings().count(), 1);
    }
}
