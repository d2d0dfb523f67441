// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert ReScript documentation JSON to Markdown.
//!
//! This crate turns the JSON emitted by `rescript-tools doc` into a single
//! Markdown document with one heading per module, type, and value.
//!
//! # Overview
//!
//! 1. [`extract`] runs the external extractor on a source file
//! 2. [`docgen`] decodes the JSON into a typed documentation tree
//! 3. [`renderer`] walks the tree and builds Markdown out of
//!    [`markdown`] fragments
//!
//! Rendering is pure and deterministic; only extraction touches the
//! outside world.
//!
//! # Example
//!
//! ```no_run
//! use docmd::{docgen, extract::Extractor, renderer};
//! use std::path::Path;
//!
//! let json = Extractor::default().run(Path::new("src/Counter.resi")).unwrap();
//! let doc = docgen::parse_doc(&json).unwrap();
//!
//! let opts = renderer::RenderOptions {
//!     show_source: true,
//!     ..Default::default()
//! };
//!
//! let markdown = renderer::render_doc(&doc, &opts);
//! println!("{markdown}");
//! ```
//!
//! # Modules
//!
//! - [`markdown`]: escaping-aware Markdown fragment builders
//! - [`docgen`]: JSON decoding and type definitions for extractor output
//! - [`renderer`]: documentation tree to Markdown
//! - [`extract`]: subprocess driver for the extractor

#![deny(missing_docs)]

pub mod docgen;
pub mod extract;
pub mod markdown;
pub mod renderer;
