pub mod blocks;
pub mod sections;

use sections::ParsedDocument;

/// Two-pass pipeline: markdown → blocks → keyed sections.
pub fn parse_document(markdown: &str) -> ParsedDocument {
    let blocks = blocks::classify_lines(markdown);
    sections::cluster_sections(&blocks)
}
