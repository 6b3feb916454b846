pub mod matching;

use serde::Serialize;
use tracing::debug;

use crate::parser::parse_document;
use crate::parser::sections::{Dropped, Heading, ParsedDocument, Section};
use crate::template::Template;
use matching::{headings_match, titles_equal, MatchOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Current,
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedBlock {
    /// Template key the block fills (`title`, `purpose` or the template heading line).
    pub key: String,
    pub origin: Origin,
    /// Heading line of the current section used, when it differs from the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeReport {
    pub blocks: Vec<EmittedBlock>,
    pub dropped: Vec<Dropped>,
}

impl MergeReport {
    pub fn from_template(&self) -> usize {
        self.blocks.iter().filter(|b| b.origin == Origin::Template).count()
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub text: String,
    pub report: MergeReport,
}

/// Merge `current` against a template given as text, with default matching.
pub fn merge(current: &str, template: &str) -> String {
    let template = Template::from_parsed(parse_document(template));
    merge_with(current, &template, &MatchOptions::default()).text
}

pub fn merge_with(current: &str, template: &Template, options: &MatchOptions) -> MergeOutcome {
    let doc = parse_document(current);
    merge_parsed(&doc, template.sections(), options)
}

pub fn merge_parsed(
    current: &ParsedDocument,
    template: &ParsedDocument,
    options: &MatchOptions,
) -> MergeOutcome {
    let mut out: Vec<String> = Vec::new();
    let mut report = MergeReport {
        blocks: Vec::new(),
        dropped: current.dropped().to_vec(),
    };

    for (cur, tpl) in [
        (current.title(), template.title()),
        (current.purpose(), template.purpose()),
    ] {
        let (section, origin) = match (cur, tpl) {
            (Some(s), _) => (s, Origin::Current),
            (None, Some(s)) => (s, Origin::Template),
            (None, None) => continue,
        };
        out.push(section.body());
        report.blocks.push(EmittedBlock {
            key: section.key.to_string(),
            origin,
            matched: None,
        });
    }

    let tpl_sections: Vec<&Section> = template.headings().collect();
    let cur_sections: Vec<&Section> = current.headings().collect();
    let claims = claim_sections(&tpl_sections, &cur_sections, options);

    for (tpl, claim) in tpl_sections.iter().zip(&claims) {
        let key = tpl.key.to_string();
        match claim {
            Some(ci) => {
                let cur = cur_sections[*ci];
                let cur_key = cur.key.to_string();
                debug!(template = %key, current = %cur_key, "section matched");
                out.push(cur.trimmed_body());
                report.blocks.push(EmittedBlock {
                    matched: (cur_key != key).then_some(cur_key),
                    key,
                    origin: Origin::Current,
                });
            }
            None => {
                debug!(template = %key, "section missing, using template");
                out.push(tpl.trimmed_body());
                report.blocks.push(EmittedBlock {
                    key,
                    origin: Origin::Template,
                    matched: None,
                });
            }
        }
    }

    for (ci, cur) in cur_sections.iter().enumerate() {
        if !claims.contains(&Some(ci)) {
            report.dropped.push(Dropped::UnmatchedSection {
                heading: cur.key.to_string(),
                line: cur.line,
            });
        }
    }

    MergeOutcome {
        text: out.join("\n\n").trim().to_string(),
        report,
    }
}

/// For each template section, the index of the current section that fills it.
///
/// Exact title matches are claimed first, then the loose predicate runs over
/// what is left in template order. A current section is claimed at most once.
fn claim_sections(
    template: &[&Section],
    current: &[&Section],
    options: &MatchOptions,
) -> Vec<Option<usize>> {
    let mut claims: Vec<Option<usize>> = vec![None; template.len()];
    let mut taken = vec![false; current.len()];

    let passes: [fn(&Heading, &Heading, &MatchOptions) -> bool; 2] = [titles_equal, headings_match];
    for predicate in passes {
        for (ti, tpl) in template.iter().enumerate() {
            if claims[ti].is_some() {
                continue;
            }
            let Some(tpl_heading) = &tpl.heading else {
                continue;
            };
            let found = current.iter().zip(&taken).position(|(cur, &t)| {
                !t && cur
                    .heading
                    .as_ref()
                    .is_some_and(|h| predicate(tpl_heading, h, options))
            });
            if let Some(ci) = found {
                taken[ci] = true;
                claims[ti] = Some(ci);
            }
        }
    }

    claims
}

// ── Tests ──
