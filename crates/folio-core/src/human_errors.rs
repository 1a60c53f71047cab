// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the front end presents it.

use crate::error::FolioError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Timing problem; trying again may work.
    Transient,
    /// The user must do something (pick other files, wait for a task).
    ActionRequired,
    /// Cannot be fixed by retrying.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the same action can succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `FolioError` into a `HumanError`.
pub fn humanize_error(err: &FolioError) -> HumanError {
    match err {
        FolioError::UnsupportedFormat(detail) => HumanError {
            message: "One of these files isn't a picture we can use.".into(),
            suggestion: format!(
                "Only photos and other raster images (JPEG, PNG, GIF, BMP, TIFF, WebP) can be added. ({detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        FolioError::DecodeError { name, detail } => {
            if detail.contains("timed out") {
                HumanError {
                    message: format!("Opening '{name}' took too long."),
                    suggestion: "The picture may be very large. Try again, or use a smaller copy.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            } else {
                HumanError {
                    message: format!("'{name}' looks damaged."),
                    suggestion: "Try opening it in another program and saving a fresh copy.".into(),
                    retriable: false,
                    severity: Severity::Permanent,
                }
            }
        }

        FolioError::BatchTooLarge { max, .. } => HumanError {
            message: "Too many pictures at once.".into(),
            suggestion: format!("Add at most {max} pictures, then make another document for the rest."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::EmptyInput => HumanError {
            message: "There are no pictures yet.".into(),
            suggestion: "Add at least one picture, then make the PDF.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::EncodingError(detail) => HumanError {
            message: "A picture couldn't be put into the PDF.".into(),
            suggestion: format!("Try converting that picture to JPEG or PNG first. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        FolioError::ResourceInvalid(_) => HumanError {
            message: "Some pictures were removed before the PDF was made.".into(),
            suggestion: "Add the pictures again, then make the PDF.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::BatchBusy => HumanError {
            message: "Still making the PDF.".into(),
            suggestion: "Wait for the current PDF to finish, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        FolioError::BatchSuperseded => HumanError {
            message: "Those pictures were replaced by newer ones.".into(),
            suggestion: "Nothing to do; the newest pictures are being used.".into(),
            retriable: false,
            severity: Severity::Transient,
        },

        FolioError::PdfError(detail) => HumanError {
            message: "The PDF couldn't be read.".into(),
            suggestion: format!("The file may be damaged or not a PDF. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        FolioError::Io(io_err) => {
            let lower = io_err.to_string().to_lowercase();
            if lower.contains("permission denied") {
                HumanError {
                    message: "We're not allowed to write there.".into(),
                    suggestion: "Choose a different folder, such as your Documents folder.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if lower.contains("no space") {
                HumanError {
                    message: "The disk is full.".into(),
                    suggestion: "Free up some space, then save again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "A file couldn't be read or saved.".into(),
                    suggestion: format!("Check the file and folder exist and try again. ({io_err})"),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        FolioError::Serialization(detail) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: format!("Fix or delete the settings file to go back to the defaults. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
