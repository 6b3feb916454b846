//! Normalize markdown documents against a section template.
//!
//! A document is split into keyed sections ([`parser`]), then every section
//! the template requires is emitted in template order, keeping the user's
//! own text wherever a heading matches ([`merge`]).

pub mod error;
pub mod io;
pub mod merge;
pub mod parser;
pub mod settings;
pub mod template;

pub use error::MdMergeError;
pub use merge::{merge, merge_with, MergeOutcome, MergeReport};
pub use template::Template;
