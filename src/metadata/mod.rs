//! Metadata parsing and representation for plugin module images.
//!
//! This module contains the container-format infrastructure the rewrite engine
//! is built on: heap streams, the six metadata tables, the owned image model
//! with its reader and canonical writer, and the identity descriptors used to
//! stamp transplanted module references.
//!
//! # Key Components
//!
//! - [`image`] - Owned [`image::ModuleImage`] model with parsing and emission
//! - [`builder`] - Fluent construction of images from scratch
//! - [`tables`] - The six fixed-width metadata tables, raw and owned variants
//! - [`streams`] - Heap streams (`#Strings`, `#Blob`, `#GUID`) and their builders
//! - [`identity`] - Module identity descriptors and key token derivation
//! - [`signatures`] - Helpers for authoring member signature blobs
//! - [`token`] - Table-tagged row references used in diagnostics
//!
//! # Examples
//!
//! ```rust,no_run
//! use rebind::metadata::image::ModuleImage;
//!
//! let image = ModuleImage::from_file("plugin.pmi".as_ref())?;
//! let unit = image.primary_unit()?;
//! println!("Module: {}", unit.module.name);
//! println!("Type refs: {}", unit.type_refs.len());
//! # Ok::<(), rebind::Error>(())
//! ```

/// Fluent construction of module images
pub mod builder;
/// Module identity descriptors and key token derivation
pub mod identity;
/// Owned module image model with reader and canonical writer
pub mod image;
/// Helpers for authoring member signature blobs
pub mod signatures;
/// Heap streams and their emission builders
pub mod streams;
/// The six fixed-width metadata tables
pub mod tables;
/// Token based addressing of table rows
pub mod token;
