use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#+)[ \t]+(.*\S)\s*$").unwrap());
static STRONG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\*\*.*\*\*$").unwrap());

/// One classified source line. Every variant keeps the raw line so section
/// bodies can be rebuilt verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: usize, title: String, raw: String },
    /// A line wrapped in `**` at both ends (after trimming).
    Strong(String),
    Text(String),
    Empty(String),
}

impl Block {
    pub fn raw(&self) -> &str {
        match self {
            Block::Heading { raw, .. } => raw,
            Block::Strong(raw) | Block::Text(raw) | Block::Empty(raw) => raw,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Block::Empty(_))
    }
}

pub fn classify_lines(markdown: &str) -> Vec<Block> {
    markdown.lines().map(classify_line).collect()
}

pub fn classify_line(line: &str) -> Block {
    if line.trim().is_empty() {
        return Block::Empty(line.to_string());
    }

    // ── ATX heading: markers must start the line ──
    if let Some(caps) = HEADING_RE.captures(line) {
        return Block::Heading {
            level: caps[1].len(),
            title: caps[2].trim().to_string(),
            raw: line.to_string(),
        };
    }

    if STRONG_RE.is_match(line.trim()) {
        return Block::Strong(line.to_string());
    }

    Block::Text(line.to_string())
}
