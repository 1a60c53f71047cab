// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command handlers. Each one drives the document engine through a `Session`
// or a `PdfInspector` and reports the outcome on stdout.

use std::path::{Path, PathBuf};

use folio_core::AppConfig;
use folio_core::error::Result;
use folio_document::{PdfInspector, RawFile, Session, verify_cross_references};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument};

use crate::cli::{BuildArgs, Cli, Command};
use crate::services::config::{default_config_path, load_config, persist_config};
use crate::services::persist::save_blob;
use crate::services::preview::PreviewReference;

pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Build(args) => build(&args, config).await.map(|path| {
            println!("{}", path.display());
        }),
        Command::Inspect { input, json } => inspect(&input, json),
        Command::Config { init } => show_config(&config, init.then_some(cli.config.as_deref())),
    }
}

/// Ingest the images, assemble them, and save the document.
///
/// Returns the path the document was written to.
#[instrument(skip_all, fields(images = args.images.len()))]
pub async fn build(args: &BuildArgs, mut config: AppConfig) -> Result<PathBuf> {
    args.apply_to(&mut config);

    let files = args
        .images
        .iter()
        .map(RawFile::read)
        .collect::<Result<Vec<_>>>()?;

    let session = Session::new(&config);
    session.load_batch(files).await?;
    let blob = session.assemble().await?;

    if args.preview {
        let preview = PreviewReference::create(&blob)?;
        println!("Preview: {}", preview.url());
        println!("Press Enter to save the document.");
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        preview.revoke()?;
    }

    let (dir, file_name) = output_location(args.output.as_deref(), &config.default_file_name);
    let path = save_blob(&blob, &dir, &file_name)?;
    session.finish_download()?;

    info!(
        path = %path.display(),
        pages = blob.page_count(),
        bytes = blob.len(),
        "Build complete"
    );
    Ok(path)
}

/// Split `-o` into a directory and a file name.
fn output_location(output: Option<&Path>, default_name: &str) -> (PathBuf, String) {
    let Some(output) = output else {
        return (PathBuf::from("."), default_name.to_string());
    };
    let dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| default_name.to_string());
    (dir, name)
}

/// Print page summaries and verify cross-reference offsets.
pub fn inspect(path: &Path, json: bool) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let inspector = PdfInspector::from_bytes(&bytes)?;
    let pages = inspector.pages()?;
    let verified = verify_cross_references(&bytes)?;

    if json {
        let report = serde_json::json!({
            "file": path.display().to_string(),
            "bytes": bytes.len(),
            "title": inspector.title(),
            "pages": pages,
            "verified_objects": verified,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}: {} pages, {} bytes", path.display(), pages.len(), bytes.len());
    if let Some(title) = inspector.title() {
        println!("title: {title}");
    }
    for page in &pages {
        match &page.image {
            Some(image) => println!(
                "  page {:>3}  {:>7.2} x {:<7.2} pt  image {}x{} {} {}{}",
                page.number,
                page.width,
                page.height,
                image.width,
                image.height,
                image.filter.as_deref().unwrap_or("raw"),
                image.color_space.as_deref().unwrap_or("?"),
                if image.has_smask { " +mask" } else { "" },
            ),
            None => println!(
                "  page {:>3}  {:>7.2} x {:<7.2} pt  (no image)",
                page.number, page.width, page.height
            ),
        }
    }
    println!("cross-reference table: {verified} objects verified");
    Ok(())
}

/// Print the configuration; with `write_to`, also save it there (or to the
/// default location when no file was named).
fn show_config(config: &AppConfig, write_to: Option<Option<&Path>>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if let Some(target) = write_to {
        let path = target.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        persist_config(&path, config)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
