//! Configuration for the rewrite engine.
//!
//! All policy is fixed at engine construction: which target modules to
//! index, which module references to strip, which name prefixes to leave
//! alone, and which facade member mappings to apply. Rewrite calls take no
//! further options, so every subject processed by one engine sees the same
//! policy.

use std::path::PathBuf;

use crate::{metadata::image::ModuleImage, rewrite::facade::FacadeMap};

/// Source a target module is loaded from.
#[derive(Debug, Clone)]
pub enum TargetSource {
    /// Parse the module from a file on disk.
    Path(PathBuf),
    /// Use an already parsed image.
    Image(ModuleImage),
}

/// Configuration for building a [`Rewriter`](crate::rewrite::Rewriter).
///
/// Target order matters twice: canonical references are appended to subjects
/// in this order, and when several targets define the same type name the
/// last one listed owns the index entry.
#[derive(Debug, Clone)]
pub struct RewriterConfig {
    /// Target modules to load and index, in order.
    pub targets: Vec<TargetSource>,

    /// Module reference names stripped from subject modules.
    pub strip_names: Vec<String>,

    /// Full-name prefixes the type walk leaves untouched (default: `["System."]`).
    ///
    /// Types under these prefixes belong to the host platform and must keep
    /// whatever scope they already have.
    pub skip_prefixes: Vec<String>,

    /// Facade member mappings applied after the type walk.
    pub facades: FacadeMap,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        RewriterConfig {
            targets: Vec::new(),
            strip_names: Vec::new(),
            skip_prefixes: vec!["System.".to_string()],
            facades: FacadeMap::default(),
        }
    }
}

impl RewriterConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a target module loaded from a file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the module image on disk
    #[must_use]
    pub fn with_target_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.targets.push(TargetSource::Path(path.into()));
        self
    }

    /// Appends a target module from an already parsed image.
    #[must_use]
    pub fn with_target_image(mut self, image: ModuleImage) -> Self {
        self.targets.push(TargetSource::Image(image));
        self
    }

    /// Appends a module reference name to strip from subjects.
    #[must_use]
    pub fn with_strip_name(mut self, name: impl Into<String>) -> Self {
        self.strip_names.push(name.into());
        self
    }

    /// Appends a full-name prefix the type walk leaves untouched.
    #[must_use]
    pub fn with_skip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.skip_prefixes.push(prefix.into());
        self
    }

    /// Replaces the skip prefix list, clearing the default.
    #[must_use]
    pub fn with_skip_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.skip_prefixes = prefixes;
        self
    }

    /// Sets the facade member mapping table.
    #[must_use]
    pub fn with_facades(mut self, facades: FacadeMap) -> Self {
        self.facades = facades;
        self
    }
}
