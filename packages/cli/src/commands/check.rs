use crate::config::Config;
use crate::frames::load_frames;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use sprig_dom::{Document, NodeId};
use sprig_vdom::Renderer;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// JSON file holding the frames to validate
    pub frames: PathBuf,

    /// Config file (defaults to sprig.config.json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Parse the frames file and render every frame with structural checks on
pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd, args.config.as_deref())?;
    let frames = load_frames(&args.frames)?;

    let (mut renderer, mut root) = scratch(&config)?;

    let total = frames.len();
    let mut error_count = 0;
    for (i, frame) in frames.into_iter().enumerate() {
        if let Err(e) = renderer.render(frame.into_frame(), root) {
            error_count += 1;
            eprintln!(
                "  {} frame {} - {}",
                "✗".red(),
                i + 1,
                e.to_string().red()
            );
            (renderer, root) = scratch(&config)?;
        }
    }

    if error_count > 0 {
        return Err(anyhow!("{} of {} frames are invalid", error_count, total));
    }

    println!(
        "{} {} frames are valid",
        "✅".green(),
        total
    );
    Ok(())
}

/// Fresh renderer with structural checks forced on
fn scratch(config: &Config) -> Result<(Renderer, NodeId)> {
    let mut document = Document::new();
    let root = document.create_element(&config.root_tag);
    let body = document.body();
    document.append_child(body, root)?;
    let renderer = Renderer::with_config(document, config.renderer.clone().with_debug_checks(true));
    Ok((renderer, root))
}
