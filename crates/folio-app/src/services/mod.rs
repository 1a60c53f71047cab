// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — the collaborators around the document engine: where
// configuration comes from, where documents are saved, and how previews are
// handed to a viewer.

pub mod config;
pub mod data_dir;
pub mod persist;
pub mod preview;

#[cfg(test)]
pub(crate) mod test_support;
