//! The rewrite engine.
//!
//! A [`Rewriter`] is built once from a [`RewriterConfig`]: it loads and
//! indexes the target modules, derives their identities, and validates the
//! facade table. Construction is the fail-fast point; a constructed engine
//! carries everything a rewrite needs and can process any number of
//! subject modules, sequentially or in parallel.
//!
//! Rewriting mutates the subject in place and runs three passes in order:
//! reference transplanting, the type scope walk, and the facade member
//! pass. When transplanting removes nothing the subject is left completely
//! untouched and the later passes never run.

use rayon::prelude::*;

use crate::{
    metadata::image::ModuleImage,
    rewrite::{
        config::{RewriterConfig, TargetSource},
        events::{RewriteLog, RewriteReport, RewriteSink},
        facade::{rewrite_member_refs, FacadeMap},
        registry::IdentityRegistry,
        retarget::transplant_references,
        scopes::rewrite_type_scopes,
        symbols::{SymbolIndex, TargetModule},
    },
    Error, Result,
};

/// Reference-rewriting engine over a fixed set of target modules.
///
/// # Examples
///
/// ```rust
/// use rebind::metadata::identity::ModuleVersion;
/// use rebind::metadata::tables::TypeFlags;
/// use rebind::rewrite::{Rewriter, RewriterConfig};
/// use rebind::ModuleBuilder;
///
/// # fn main() -> rebind::Result<()> {
/// let target = ModuleBuilder::new("Platform.Core")
///     .version(2, 0, 0)
///     .type_def("Host.Api", "Widget", TypeFlags::PUBLIC)
///     .build()?;
///
/// let mut subject = ModuleBuilder::new("Plugin")
///     .module_ref("Legacy.Platform", ModuleVersion::new(1, 0, 0))
///     .type_ref(1, "Host.Api", "Widget")
///     .build()?;
///
/// let rewriter = Rewriter::new(
///     RewriterConfig::new()
///         .with_target_image(target)
///         .with_strip_name("Legacy.Platform"),
/// )?;
///
/// let report = rewriter.rewrite(&mut subject)?;
/// assert!(report.changed());
/// assert_eq!(report.refs_removed, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Rewriter {
    targets: Vec<TargetModule>,
    index: SymbolIndex,
    registry: IdentityRegistry,
    strip_names: Vec<String>,
    skip_prefixes: Vec<String>,
    facades: FacadeMap,
}

impl Rewriter {
    /// Builds an engine from the given configuration.
    ///
    /// Targets are loaded and indexed in configuration order and every
    /// facade replacement is checked against the index, so a successfully
    /// constructed engine cannot later discover a missing target or a
    /// dangling facade mapping mid-rewrite.
    ///
    /// # Errors
    /// Returns [`Error::TargetLoad`] when a path target cannot be read or
    /// parsed, and [`Error::FacadeTarget`] when a facade replacement is not
    /// defined by any target.
    pub fn new(config: RewriterConfig) -> Result<Self> {
        let registry = IdentityRegistry::new();
        let mut targets = Vec::with_capacity(config.targets.len());

        for source in config.targets {
            let target = match source {
                TargetSource::Path(path) => ModuleImage::from_file(&path)
                    .and_then(|image| TargetModule::load(image, &registry))
                    .map_err(|source| Error::TargetLoad {
                        path: path.display().to_string(),
                        source: Box::new(source),
                    })?,
                TargetSource::Image(image) => TargetModule::load(image, &registry)?,
            };
            targets.push(target);
        }

        let index = SymbolIndex::build(&targets);

        for (_, mapping) in config.facades.mappings() {
            let replacement = &mapping.replacement;
            let defined = index
                .resolve(&replacement.type_name)
                .and_then(|position| targets.get(position))
                .is_some_and(|target| {
                    target.has_public_member(
                        &replacement.type_name,
                        &replacement.member,
                        &replacement.signature,
                    )
                });
            if !defined {
                return Err(Error::FacadeTarget {
                    type_name: replacement.type_name.clone(),
                    member: replacement.member.clone(),
                });
            }
        }

        Ok(Rewriter {
            targets,
            index,
            registry,
            strip_names: config.strip_names,
            skip_prefixes: config.skip_prefixes,
            facades: config.facades,
        })
    }

    /// Returns the loaded targets in configuration order.
    #[must_use]
    pub fn targets(&self) -> &[TargetModule] {
        &self.targets
    }

    /// Returns the symbol index over all targets.
    #[must_use]
    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    /// Returns the identity registry backing this engine.
    #[must_use]
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Rewrites one subject module in place.
    ///
    /// The returned report carries the journal of notices along with per-pass
    /// site counters. A subject with no reference matching the strip list is
    /// left untouched and yields an unchanged report with an empty journal.
    ///
    /// # Errors
    /// Returns [`Error::MultiUnit`] when the subject contains more than one
    /// unit; the subject is not mutated in that case.
    pub fn rewrite(&self, image: &mut ModuleImage) -> Result<RewriteReport> {
        let mut log = RewriteLog::new();
        let mut report = self.run(image, &mut log)?;
        report.log = log;
        Ok(report)
    }

    /// Rewrites one subject module, streaming events to a caller-supplied
    /// sink instead of journaling them.
    ///
    /// The returned report carries the counters; its journal stays empty
    /// because every event went to `sink`.
    ///
    /// # Errors
    /// Returns [`Error::MultiUnit`] when the subject contains more than one
    /// unit.
    pub fn rewrite_with_sink(
        &self,
        image: &mut ModuleImage,
        sink: &mut dyn RewriteSink,
    ) -> Result<RewriteReport> {
        self.run(image, sink)
    }

    /// Rewrites a batch of subject modules in parallel.
    ///
    /// Results are returned in input order; one subject failing does not
    /// affect the others.
    pub fn rewrite_all(&self, images: &mut [ModuleImage]) -> Vec<Result<RewriteReport>> {
        images
            .par_iter_mut()
            .map(|image| self.rewrite(image))
            .collect()
    }

    fn run(&self, image: &mut ModuleImage, sink: &mut dyn RewriteSink) -> Result<RewriteReport> {
        let unit = image.primary_unit_mut()?;
        let mut report = RewriteReport::default();

        let Some(outcome) = transplant_references(unit, &self.targets, &self.strip_names, sink)
        else {
            return Ok(report);
        };
        report.refs_removed = outcome.removed;
        report.refs_added = outcome.added;

        report.type_sites_redirected = rewrite_type_scopes(
            unit,
            &self.index,
            &self.targets,
            &outcome.target_ref_rids,
            &outcome.detached,
            &self.skip_prefixes,
            sink,
        );

        report.member_sites_redirected = rewrite_member_refs(
            unit,
            &self.index,
            &self.targets,
            &outcome.target_ref_rids,
            &self.facades,
            sink,
        );

        Ok(report)
    }
}
