use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use mdmerge::merge::matching::MatchOptions;
use mdmerge::settings::Settings;
use mdmerge::{io, merge, parser, MergeReport, Template};

#[derive(Parser)]
#[command(name = "mdmerge", about = "Normalize markdown documents against a section template")]
struct Cli {
    /// Settings file (default: ./mdmerge.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TemplateArg {
    /// Template document (default: settings, then the bundled template)
    #[arg(short, long)]
    template: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge documents against the template
    Merge {
        /// Documents to merge
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        template: TemplateArg,
        /// Write merged output back to each file
        #[arg(short, long, conflicts_with = "check")]
        in_place: bool,
        /// Report files that would change; exit 1 if any
        #[arg(long)]
        check: bool,
        /// Let headings of different levels match
        #[arg(long)]
        any_level: bool,
        /// Match heading words case-sensitively
        #[arg(long)]
        case_sensitive: bool,
        /// Write a JSON report of emitted and dropped sections
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Show how a document is split into sections
    Sections {
        file: PathBuf,
    },
    /// Print the effective template
    Template {
        #[command(flatten)]
        template: TemplateArg,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Merge {
            files,
            template,
            in_place,
            check,
            any_level,
            case_sensitive,
            report,
        } => {
            let tpl = resolve_template(&template, &settings)?;
            let mut options = settings.match_options();
            options.require_same_level &= !any_level;
            options.case_sensitive |= case_sensitive;
            let mode = if check {
                Mode::Check
            } else if in_place {
                Mode::InPlace
            } else {
                Mode::Print
            };
            let results = merge_files(&files, &tpl, &options, mode)?;

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&results)?;
                io::write_text_or_print(Some(&path), &json)?;
                info!(path = %path.display(), "report written");
            }

            let changed: Vec<_> = results.iter().filter(|r| r.changed).collect();
            match mode {
                Mode::Check => {
                    for r in &changed {
                        println!("would change: {}", r.path.display());
                    }
                    if !changed.is_empty() {
                        return Ok(ExitCode::from(1));
                    }
                }
                Mode::InPlace => {
                    println!("Updated {} of {} files.", changed.len(), results.len());
                }
                Mode::Print => {}
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Sections { file } => {
            let text = io::read_text(&file)?;
            let doc = parser::parse_document(&text);
            println!("{:>5} | {:>5} | {:>5} | Key", "Line", "Level", "Lines");
            println!("{}", "-".repeat(48));
            for s in doc.sections() {
                let level = s.level().map(|l| l.to_string()).unwrap_or_else(|| "-".into());
                println!("{:>5} | {:>5} | {:>5} | {}", s.line, level, s.lines.len(), s.key);
            }
            for d in doc.dropped() {
                println!("dropped: {}", d);
            }
            println!("\n{} sections", doc.len());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Template { template } => {
            let tpl = resolve_template(&template, &settings)?;
            io::write_text_or_print(None, &tpl.render())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Print,
    InPlace,
    Check,
}

#[derive(Serialize)]
struct FileResult {
    path: PathBuf,
    changed: bool,
    #[serde(flatten)]
    report: MergeReport,
    #[serde(skip)]
    text: String,
}

fn resolve_template(arg: &TemplateArg, settings: &Settings) -> anyhow::Result<Template> {
    let path = arg.template.as_deref().or(settings.template.as_deref());
    let tpl = Template::resolve(path)?;
    info!(template = tpl.name(), "using template");
    Ok(tpl)
}

fn merge_file(path: &Path, tpl: &Template, options: &MatchOptions) -> anyhow::Result<FileResult> {
    let current = io::read_text(path)?;
    let outcome = merge::merge_with(&current, tpl, options);
    for dropped in &outcome.report.dropped {
        warn!(file = %path.display(), "{}", dropped);
    }
    info!(
        file = %path.display(),
        from_template = outcome.report.from_template(),
        "merged"
    );
    Ok(FileResult {
        path: path.to_path_buf(),
        changed: outcome.text != current.trim_end(),
        report: outcome.report,
        text: outcome.text,
    })
}

fn merge_files(
    files: &[PathBuf],
    tpl: &Template,
    options: &MatchOptions,
    mode: Mode,
) -> anyhow::Result<Vec<FileResult>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = if files.len() > 1 && mode != Mode::Print {
        ProgressBar::new(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .context("progress template")?
            .progress_chars("#>-"),
    );

    let results = files
        .par_iter()
        .map(|path| {
            let result = merge_file(path, tpl, options);
            pb.inc(1);
            result
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    pb.finish_and_clear();

    for r in &results {
        match mode {
            Mode::InPlace if r.changed => io::write_text_or_print(Some(&r.path), &r.text)?,
            Mode::Print if files.len() > 1 => {
                println!("==> {} <==", r.path.display());
                io::write_text_or_print(None, &r.text)?;
                println!();
            }
            Mode::Print => io::write_text_or_print(None, &r.text)?,
            _ => {}
        }
    }

    Ok(results)
}
