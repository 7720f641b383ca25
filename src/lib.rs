// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # rebind
//!
//! [![Crates.io](https://img.shields.io/crates/v/rebind.svg)](https://crates.io/crates/rebind)
//! [![Documentation](https://docs.rs/rebind/badge.svg)](https://docs.rs/rebind)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/rebind/blob/main/LICENSE-APACHE)
//!
//! A reference-rewriting engine that keeps compiled plugin modules loadable after their
//! host platform changes shape. `rebind` parses plugin module images, indexes the types
//! the host's current modules define, and rewrites stale module, type, and member
//! references in place so binaries compiled against an older platform keep resolving.
//!
//! ## Features
//!
//! - **📦 Full image round trip** - Parse plugin module images from file or memory and
//!   re-emit them canonically, byte-stable across runs
//! - **🔁 Reference transplanting** - Strip outdated module references and stamp in
//!   canonical references to the current platform modules
//! - **🔍 Symbol indexing** - One ordered index over every reachable type in the target
//!   modules, shared by all rewrites
//! - **🎭 Facade member mappings** - Redirect member references to drop-in replacements,
//!   optionally gated on whether the original still resolves
//! - **📝 Deterministic notices** - Sorted walk order and per-name deduplication give
//!   byte-identical journals for identical inputs
//! - **⚡ Batch rewriting** - Process whole plugin directories in parallel against one
//!   shared engine
//!
//! ## Quick Start
//!
//! Add `rebind` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! rebind = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use rebind::prelude::*;
//!
//! let platform = ModuleBuilder::new("Platform.Core")
//!     .version(2, 0, 0)
//!     .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
//!     .build()?;
//!
//! let rewriter = Rewriter::new(
//!     RewriterConfig::new()
//!         .with_target_image(platform)
//!         .with_strip_name("Legacy.Platform"),
//! )?;
//! # let _ = rewriter;
//! # Ok::<(), rebind::Error>(())
//! ```
//!
//! ### Basic Usage
//!
//! ```rust,no_run
//! use rebind::rewrite::{Rewriter, RewriterConfig};
//! use rebind::ModuleImage;
//!
//! // Build one engine over the current platform modules.
//! let rewriter = Rewriter::new(
//!     RewriterConfig::new()
//!         .with_target_path("host/Platform.Core.pmi")
//!         .with_strip_name("Legacy.Platform"),
//! )?;
//!
//! // Rewrite a plugin in place and persist it.
//! let mut plugin = ModuleImage::from_file("plugins/OldPlugin.pmi".as_ref())?;
//! let report = rewriter.rewrite(&mut plugin)?;
//! for event in &report.log {
//!     println!("  {event}");
//! }
//! if report.changed() {
//!     plugin.write_file("plugins/OldPlugin.pmi".as_ref())?;
//! }
//! # Ok::<(), rebind::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `rebind` is organized into a small set of modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - Image container parsing, heaps, tables, identities, and the builder
//! - [`rewrite`] - The engine: transplanting, the scope walk, and facade mappings
//! - [`Error`] and [`Result`] - Error handling used throughout the crate
//!
//! A [`ModuleImage`] owns its data outright, so rewriting mutates plain Rust structures
//! and emission rebuilds heaps from scratch. Equal models always serialize to identical
//! bytes, which is what makes the engine's no-op guarantee checkable: a subject with no
//! strip-listed references comes back byte-identical.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) with detailed error information:
//!
//! ```rust,no_run
//! use rebind::{Error, ModuleImage};
//!
//! match ModuleImage::from_file("plugins/Plugin.pmi".as_ref()) {
//!     Ok(image) => println!("loaded {} unit(s)", image.unit_count()),
//!     Err(Error::NotSupported) => println!("unsupported format version"),
//!     Err(Error::Malformed { message, .. }) => println!("malformed image: {message}"),
//!     Err(e) => println!("error: {e}"),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! The crate includes fuzzing support for the image parser:
//!
//! ```bash
//! # Install fuzzing tools
//! cargo install cargo-fuzz
//!
//! # Run the parser fuzzer
//! cargo +nightly fuzz run image --release
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```

#[macro_use]
pub(crate) mod error;
pub mod file;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust,no_run
/// use rebind::prelude::*;
///
/// let mut plugin = ModuleImage::from_file("plugins/Plugin.pmi".as_ref())?;
/// println!("module: {}", plugin.name());
/// # Ok::<(), rebind::Error>(())
/// ```
pub mod prelude;

/// Definitions, parsing, and emission of plugin module image metadata.
///
/// This module implements the complete image substrate the rewrite engine
/// operates on: heap streams, the six metadata tables in raw and owned form,
/// the container reader and canonical writer, identity descriptors, and a
/// fluent builder for constructing images programmatically.
///
/// # Key Components
///
/// - [`metadata::image`] - [`ModuleImage`] parse/emit and the owned unit model
/// - [`metadata::builder`] - [`ModuleBuilder`] for images built from scratch
/// - [`metadata::tables`] - Raw and owned rows plus their flag types
/// - [`metadata::streams`] - `#Strings`, `#Blob`, and `#GUID` heaps with builders
/// - [`metadata::identity`] - Module identities and key token derivation
/// - [`metadata::signatures`] - Member signature blob helpers
/// - [`metadata::token`] - Table-tagged row tokens used in diagnostics
pub mod metadata;

/// Reference rewriting over plugin module images.
///
/// Builds an engine over the host's current target modules and rewrites
/// subject modules in place: module references are transplanted, type
/// reference scopes repointed, and facade member mappings applied. See
/// [`rewrite::Rewriter`] for the pipeline and a complete example.
pub mod rewrite;

/// `rebind` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. This is used consistently throughout the crate for all
/// fallible operations.
///
/// # Examples
///
/// ```rust,no_run
/// use rebind::{ModuleImage, Result};
///
/// fn load_plugin(path: &str) -> Result<ModuleImage> {
///     ModuleImage::from_file(std::path::Path::new(path))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `rebind` Error type
///
/// The main error type for all operations in this crate. Provides detailed
/// error information for image parsing, emission, and rewriting.
///
/// # Examples
///
/// ```rust,no_run
/// use rebind::{Error, ModuleImage};
///
/// match ModuleImage::from_file("plugins/Plugin.pmi".as_ref()) {
///     Ok(image) => println!("loaded successfully"),
///     Err(Error::NotSupported) => println!("unsupported format version"),
///     Err(Error::Malformed { message, .. }) => println!("malformed: {}", message),
///     Err(e) => println!("error: {}", e),
/// }
/// ```
pub use error::Error;

/// Main entry point for working with plugin module images.
///
/// A [`ModuleImage`] owns one or more [`ModuleUnit`]s; the first unit names
/// the module. See [`metadata::image`] for the container format details.
///
/// # Example
///
/// ```rust,no_run
/// use rebind::ModuleImage;
/// let image = ModuleImage::from_file("plugins/Plugin.pmi".as_ref())?;
/// println!("module: {}", image.name());
/// # Ok::<(), rebind::Error>(())
/// ```
pub use metadata::image::{ModuleImage, ModuleUnit};

/// Fluent construction of module images from scratch.
///
/// # Example
///
/// ```rust
/// use rebind::ModuleBuilder;
/// use rebind::metadata::tables::TypeFlags;
///
/// let image = ModuleBuilder::new("Platform.Core")
///     .version(2, 0, 0)
///     .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
///     .build()?;
/// assert_eq!(image.name(), "Platform.Core");
/// # Ok::<(), rebind::Error>(())
/// ```
pub use metadata::builder::ModuleBuilder;

/// Metadata heaps for direct access to an image's string, blob, and GUID data.
///
/// These types provide low-level access to the heap structures:
/// - [`Strings`] - Null-terminated UTF-8 names
/// - [`Blob`] - Length-prefixed binary blobs (keys, signatures)
/// - [`Guid`] - 16-byte module variant identifiers
pub use metadata::streams::{Blob, Guid, Strings};

/// Provides access to low-level file and memory parsing utilities.
///
/// The [`Parser`] type is a bounds-checked little-endian cursor over a byte
/// slice; [`File`] abstracts memory-mapped and in-memory backings.
pub use file::{parser::Parser, File};
