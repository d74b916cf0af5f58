use crate::config::Config;
use crate::frames::load_frames;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use sprig_dom::{Document, MutationRecord};
use sprig_vdom::{RenderStats, Renderer};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON file holding the frames to render
    pub frames: PathBuf,

    /// Config file (defaults to sprig.config.json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Tag of the root element (overrides config)
    #[arg(long)]
    pub root_tag: Option<String>,

    /// Only print statistics, not markup
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a JSON report instead of text
    #[arg(long)]
    pub json: bool,
}

/// Document mutations observed during one frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MutationSummary {
    pub inserted: usize,
    pub removed: usize,
    pub moved: usize,
    pub props: usize,
    pub text: usize,
}

impl MutationSummary {
    pub fn from_records(records: &[MutationRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record {
                MutationRecord::Inserted { .. } => summary.inserted += 1,
                MutationRecord::Removed { .. } => summary.removed += 1,
                MutationRecord::Moved { .. } => summary.moved += 1,
                MutationRecord::Text { .. } => summary.text += 1,
                MutationRecord::Attribute { .. }
                | MutationRecord::Property { .. }
                | MutationRecord::ClassName { .. }
                | MutationRecord::Style { .. }
                | MutationRecord::Value { .. }
                | MutationRecord::InnerHtml { .. } => summary.props += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.inserted + self.removed + self.moved + self.props + self.text
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub frame: usize,
    pub stats: RenderStats,
    pub mutations: MutationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
}

pub fn replay(args: ReplayArgs, cwd: &Path) -> Result<()> {
    let mut config = Config::load(cwd, args.config.as_deref())?;
    if let Some(root_tag) = &args.root_tag {
        config.root_tag = root_tag.clone();
    }

    let frames = load_frames(&args.frames)?;
    let reports = run_frames(frames, &config, !args.quiet)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "🌱 Replaying".bright_blue().bold(),
        args.frames.display()
    );
    for report in &reports {
        print_report(report);
    }
    println!();
    println!(
        "{} Replayed {} frames",
        "✅".green(),
        reports.len()
    );
    Ok(())
}

/// Render every frame into one root, observing the document as it goes
pub fn run_frames(
    frames: Vec<crate::frames::NodeSpec>,
    config: &Config,
    with_markup: bool,
) -> Result<Vec<FrameReport>> {
    let mut document = Document::new();
    let root = document.create_element(&config.root_tag);
    let body = document.body();
    document.append_child(body, root)?;
    let mut renderer = Renderer::with_config(document, config.renderer.clone());

    let mut reports = Vec::with_capacity(frames.len());
    for (i, frame) in frames.into_iter().enumerate() {
        let number = i + 1;
        renderer.document_mut().observe();
        let result = renderer.render(frame.into_frame(), root);
        let records = renderer.document_mut().disconnect();
        let stats = result.map_err(|e| anyhow!("Frame {}: {}", number, e))?;

        let mutations = MutationSummary::from_records(&records);
        info!(frame = number, mutations = mutations.total(), "frame rendered");
        reports.push(FrameReport {
            frame: number,
            stats,
            mutations,
            markup: with_markup.then(|| renderer.document().inner_html(root)),
        });
    }
    Ok(reports)
}

fn print_report(report: &FrameReport) {
    let m = &report.mutations;
    let summary = format!(
        "+{} -{} ↻{} props {} text {}",
        m.inserted, m.removed, m.moved, m.props, m.text
    );
    let summary = if m.total() == 0 {
        summary.dimmed()
    } else {
        summary.normal()
    };
    println!(
        "  {} frame {}  {}",
        "✓".green(),
        report.frame.to_string().cyan(),
        summary
    );
    if let Some(markup) = &report.markup {
        println!("    {}", markup);
    }
}
