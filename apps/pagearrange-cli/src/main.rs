//! Page arranger command line
//!
//! Renders every page of a PDF with MuPDF, applies the requested reorder,
//! rotate and crop edits, and writes the rebuilt document.

mod config;
mod edits;
mod renderer;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pagearrange_core::{parse_order, EditorConfig, EditorSession, PageId};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::edits::{CropSpec, EditScript, MoveSpec, RotateSpec};
use crate::renderer::MupdfRenderer;

#[derive(Parser, Debug)]
#[command(name = "pagearrange")]
#[command(version, about = "Reorder, rotate and crop the pages of a PDF")]
struct Args {
    /// Input PDF
    input: PathBuf,

    /// Output PDF (defaults to the configured export file name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file with editor settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render scale relative to PDF points
    #[arg(long)]
    scale: Option<f64>,

    /// Full page order, e.g. "3,1,2" or "4-1"
    #[arg(long)]
    order: Option<String>,

    /// Move the page at display position FROM to TO (repeatable)
    #[arg(long = "move", value_name = "FROM:TO")]
    moves: Vec<MoveSpec>,

    /// Rotate an original page clockwise by DEGREES (repeatable)
    #[arg(long = "rotate", value_name = "PAGE:DEGREES", allow_hyphen_values = true)]
    rotations: Vec<RotateSpec>,

    /// Crop an original page to a pixel box of its render (repeatable)
    #[arg(long = "crop", value_name = "PAGE:X,Y,W,H")]
    crops: Vec<CropSpec>,

    /// Print document info as JSON and exit without editing
    #[arg(long)]
    info: bool,
}

#[derive(Serialize)]
struct InfoReport<'a> {
    document: &'a pagearrange_core::PdfInfo,
    pages: Vec<&'a pagearrange_core::PageInfo>,
}

impl Args {
    fn editor_config(&self) -> Result<EditorConfig> {
        let mut config = match &self.config {
            Some(path) => config::from_file(path)?,
            None => EditorConfig::default(),
        };
        if let Some(scale) = self.scale {
            config = config.with_render_scale(scale);
        }
        config.validate().context("Invalid settings")?;
        Ok(config)
    }

    fn edit_script(&self) -> Result<EditScript> {
        let order = self
            .order
            .as_deref()
            .map(parse_order)
            .transpose()
            .context("Invalid --order")?;
        Ok(EditScript {
            order,
            moves: self.moves.clone(),
            rotations: self.rotations.clone(),
            crops: self.crops.clone(),
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = args.editor_config()?;
    let script = args.edit_script()?;

    let input = args
        .input
        .to_str()
        .with_context(|| format!("Input path is not valid UTF-8: {}", args.input.display()))?;
    let bytes = fs::read(&args.input).with_context(|| format!("Failed to read {}", input))?;

    tracing::info!("pagearrange v{}", env!("CARGO_PKG_VERSION"));

    let renderer = MupdfRenderer::open(input)?;
    let mut session = EditorSession::new(config)?;
    session
        .load(&bytes, &renderer)
        .await
        .with_context(|| format!("Failed to load {}", input))?;

    if args.info {
        return print_info(&session);
    }

    script
        .apply(&mut session)
        .context("Failed to apply edits")?;

    let exported = session.build_export().context("Failed to export")?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&exported.file_name));
    fs::write(&output, &exported.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    session.mark_exported();

    tracing::info!(
        "Wrote {} pages to {}",
        exported.page_count,
        output.display()
    );
    Ok(())
}

fn print_info(session: &EditorSession) -> Result<()> {
    let document = session.info().context("No document loaded")?;
    let pages = session
        .page_order()
        .iter()
        .filter_map(|&id: &PageId| session.page(id).map(|p| &p.info))
        .collect();
    let report = InfoReport { document, pages };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
