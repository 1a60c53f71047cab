// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use folio_core::AppConfig;
use folio_core::types::{PageOrientation, PageSizePolicy, PaperSize};

/// Resolution assumed by `--fit-image` when `--dpi` is not given.
pub const DEFAULT_DPI: u32 = 96;

#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Turn an ordered set of images into a single PDF", long_about = None)]
pub struct Cli {
    /// Configuration file (JSON); defaults to config.json in the data directory
    #[arg(long, global = true, value_name = "FILE", env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a PDF with one page per image, in the order given
    Build(BuildArgs),

    /// Summarise the pages of a PDF and check its cross-reference table
    Inspect {
        /// PDF file to inspect
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        /// Also write it to the configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Images to combine, one page each
    #[arg(value_name = "IMAGES", required = true)]
    pub images: Vec<PathBuf>,

    /// Output file (defaults to the configured file name in the current directory)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Paper size for every page
    #[arg(long, value_enum)]
    pub paper: Option<PaperArg>,

    /// Size each page to its image instead of using paper
    #[arg(long, conflicts_with = "paper")]
    pub fit_image: bool,

    /// Image resolution used with --fit-image
    #[arg(long, value_name = "DPI", requires = "fit_image")]
    pub dpi: Option<u32>,

    /// Page orientation on paper
    #[arg(long, value_enum)]
    pub orientation: Option<OrientationArg>,

    /// Blank border around each image, in millimetres
    #[arg(long, value_name = "MM")]
    pub margin_mm: Option<f32>,

    /// Document title
    #[arg(long)]
    pub title: Option<String>,

    /// Re-encode JPEG images instead of embedding them unchanged
    #[arg(long)]
    pub no_jpeg_passthrough: bool,

    /// Write a temporary preview copy and wait before saving
    #[arg(long)]
    pub preview: bool,
}

impl BuildArgs {
    /// Layer the command-line options over `config`.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(paper) = self.paper {
            config.page_size = PageSizePolicy::Fixed(paper.into());
        }
        if self.fit_image {
            config.page_size = PageSizePolicy::ImageNative {
                dpi: self.dpi.unwrap_or(DEFAULT_DPI),
            };
        }
        if let Some(orientation) = self.orientation {
            config.orientation = orientation.into();
        }
        if let Some(margin) = self.margin_mm {
            config.margin_mm = margin;
        }
        if let Some(title) = &self.title {
            config.title = Some(title.clone());
        }
        if self.no_jpeg_passthrough {
            config.jpeg_passthrough = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrientationArg {
    Portrait,
    Landscape,
    Auto,
}

impl From<OrientationArg> for PageOrientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
            OrientationArg::Auto => Self::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_args(args: &[&str]) -> BuildArgs {
        let cli = Cli::try_parse_from(["folio", "build"].iter().chain(args)).unwrap();
        match cli.command {
            Command::Build(build) => build,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn overrides_are_applied() {
        let args = build_args(&[
            "a.jpg",
            "b.png",
            "--paper",
            "letter",
            "--orientation",
            "auto",
            "--margin-mm",
            "5",
            "--title",
            "Trip",
            "--no-jpeg-passthrough",
        ]);
        assert_eq!(args.images.len(), 2);

        let mut config = AppConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.page_size, PageSizePolicy::Fixed(PaperSize::Letter));
        assert_eq!(config.orientation, PageOrientation::Auto);
        assert_eq!(config.margin_mm, 5.0);
        assert_eq!(config.title.as_deref(), Some("Trip"));
        assert!(!config.jpeg_passthrough);
    }

    #[test]
    fn fit_image_uses_default_dpi() {
        let mut config = AppConfig::default();
        build_args(&["a.jpg", "--fit-image"]).apply_to(&mut config);
        assert_eq!(config.page_size, PageSizePolicy::ImageNative { dpi: DEFAULT_DPI });

        build_args(&["a.jpg", "--fit-image", "--dpi", "300"]).apply_to(&mut config);
        assert_eq!(config.page_size, PageSizePolicy::ImageNative { dpi: 300 });
    }

    #[test]
    fn no_flags_keep_the_config() {
        let mut config = AppConfig {
            margin_mm: 3.0,
            ..AppConfig::default()
        };
        build_args(&["a.jpg"]).apply_to(&mut config);
        assert_eq!(config.margin_mm, 3.0);
        assert!(config.jpeg_passthrough);
    }

    #[test]
    fn invalid_combinations_are_rejected() {
        assert!(Cli::try_parse_from(["folio", "build"]).is_err());
        assert!(Cli::try_parse_from(["folio", "build", "a.jpg", "--dpi", "300"]).is_err());
        assert!(
            Cli::try_parse_from(["folio", "build", "a.jpg", "--fit-image", "--paper", "a4"])
                .is_err()
        );
    }
}
