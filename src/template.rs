use std::path::Path;

use tracing::{debug, warn};

use crate::error::MdMergeError;
use crate::io;
use crate::parser::parse_document;
use crate::parser::sections::ParsedDocument;

const BUILTIN: &str = include_str!("../templates/metagame.md");

/// A parsed template document. Its heading order is the canonical output order.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    sections: ParsedDocument,
}

impl Template {
    /// Parse template text, rejecting documents with no heading sections.
    pub fn parse(name: &str, text: &str) -> Result<Self, MdMergeError> {
        let sections = parse_document(text);
        if sections.headings().next().is_none() {
            return Err(MdMergeError::EmptyTemplate {
                name: name.to_string(),
            });
        }
        for dropped in sections.dropped() {
            warn!(template = name, "{}", dropped);
        }
        debug!(template = name, sections = sections.len(), "template parsed");
        Ok(Self {
            name: name.to_string(),
            sections,
        })
    }

    /// Wrap an already parsed document without validation.
    pub fn from_parsed(sections: ParsedDocument) -> Self {
        Self {
            name: "<inline>".to_string(),
            sections,
        }
    }

    pub fn load(path: &Path) -> Result<Self, MdMergeError> {
        let text = io::read_text(path)?;
        Self::parse(&path.display().to_string(), &text)
    }

    /// The bundled metagame template.
    pub fn builtin() -> Self {
        Self::from_parsed(parse_document(BUILTIN)).named("builtin:metagame")
    }

    /// `path` when given, the bundled template otherwise.
    pub fn resolve(path: Option<&Path>) -> Result<Self, MdMergeError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    pub fn builtin_text() -> &'static str {
        BUILTIN
    }

    fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sections(&self) -> &ParsedDocument {
        &self.sections
    }

    /// The template rendered back as blocks, as a merge with no user content would.
    pub fn render(&self) -> String {
        crate::merge::merge_parsed(
            &ParsedDocument::default(),
            &self.sections,
            &Default::default(),
        )
        .text
    }
}
