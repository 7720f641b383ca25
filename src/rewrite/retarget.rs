//! Module reference transplanting.
//!
//! The transplant pass strips module references whose names match the
//! configured strip list and appends one canonical reference per target
//! module. Removal is batched: a single remap table takes every surviving
//! reference to its compacted RID and every stripped one to zero, and all
//! scope columns are rewritten through that table at once, so sites never
//! pass through an inconsistent intermediate numbering.

use std::collections::HashMap;

use crate::{
    metadata::image::ModuleUnit,
    rewrite::{
        events::{RewriteEvent, RewriteSink},
        symbols::TargetModule,
    },
};

/// Outcome of a transplant that removed at least one reference.
#[derive(Debug)]
pub(crate) struct TransplantOutcome {
    /// Module references removed from the subject.
    pub removed: usize,
    /// Canonical references added, one per target.
    pub added: usize,
    /// RID of the canonical reference for each target, in target order.
    pub target_ref_rids: Vec<u32>,
    /// Names of stripped references, keyed by the position of each type
    /// reference site that pointed at one. The site's scope is 0 after the
    /// transplant; the walk uses these names when reporting where a
    /// repointed site used to look.
    pub detached: HashMap<usize, String>,
}

/// Strips matching references and appends canonical target references.
///
/// Returns `None` when no reference matches the strip list; the unit is
/// left completely untouched in that case and the caller skips the
/// remaining passes.
///
/// Removal notices are emitted per removed row in ascending RID order,
/// followed by one addition notice per target.
pub(crate) fn transplant_references(
    unit: &mut ModuleUnit,
    targets: &[TargetModule],
    strip_names: &[String],
    sink: &mut dyn RewriteSink,
) -> Option<TransplantOutcome> {
    let strip = |name: &str| strip_names.iter().any(|s| s == name);

    let removed = unit.module_refs.iter().filter(|r| strip(&r.name)).count();
    if removed == 0 {
        return None;
    }

    // Old RID to new RID, index 0 unused; stripped rows map to 0.
    let mut remap = vec![0u32; unit.module_refs.len() + 1];
    let mut next = 0u32;
    for (i, reference) in unit.module_refs.iter().enumerate() {
        if !strip(&reference.name) {
            next += 1;
            remap[i + 1] = next;
        }
    }

    // Remap scopes while the stripped rows are still present, so sites
    // losing their scope can keep a record of the name they pointed at.
    let mut detached = HashMap::new();
    for (i, site) in unit.type_refs.iter_mut().enumerate() {
        let old = site.scope as usize;
        let new_scope = remap.get(old).copied().unwrap_or(0);
        if old != 0 && new_scope == 0 {
            if let Some(reference) = unit.module_refs.get(old - 1) {
                detached.insert(i, reference.name.clone());
            }
        }
        site.scope = new_scope;
    }

    let old_refs = std::mem::take(&mut unit.module_refs);
    let mut kept = Vec::with_capacity(old_refs.len() - removed + targets.len());
    for (i, reference) in old_refs.into_iter().enumerate() {
        if remap[i + 1] == 0 {
            sink.record(RewriteEvent::ReferenceRemoved {
                name: reference.name,
            });
        } else {
            kept.push(reference);
        }
    }
    unit.module_refs = kept;

    let mut target_ref_rids = Vec::with_capacity(targets.len());
    for target in targets {
        unit.module_refs.push(target.identity().as_module_ref());
        target_ref_rids.push(unit.module_refs.len() as u32);
        sink.record(RewriteEvent::ReferenceAdded {
            name: target.name().to_string(),
        });
    }

    Some(TransplantOutcome {
        removed,
        added: targets.len(),
        target_ref_rids,
        detached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        builder::ModuleBuilder, identity::ModuleVersion, tables::TypeFlags,
    };
    use crate::rewrite::{events::RewriteLog, registry::IdentityRegistry};

    fn target(name: &str) -> TargetModule {
        let image = ModuleBuilder::new(name)
            .version(1, 0, 0)
            .type_def("Api", "Entry", TypeFlags::PUBLIC)
            .build()
            .unwrap();
        TargetModule::load(image, &IdentityRegistry::new()).unwrap()
    }

    #[test]
    fn no_match_leaves_unit_untouched() {
        let mut unit = ModuleBuilder::new("Subject")
            .module_ref("Keep.Me", ModuleVersion::new(1, 0, 0))
            .type_ref(1, "Api", "Entry")
            .build_unit()
            .unwrap();
        let before = unit.clone();
        let targets = vec![target("Platform.Core")];
        let mut log = RewriteLog::new();

        let outcome = transplant_references(
            &mut unit,
            &targets,
            &["Legacy.Platform".to_string()],
            &mut log,
        );

        assert!(outcome.is_none());
        assert_eq!(unit, before);
        assert!(log.is_empty());
    }

    #[test]
    fn strips_remaps_and_appends_in_order() {
        let mut unit = ModuleBuilder::new("Subject")
            .module_ref("Legacy.Platform", ModuleVersion::new(1, 2, 0))
            .module_ref("Keep.Me", ModuleVersion::new(1, 0, 0))
            .module_ref("Legacy.Platform.x64", ModuleVersion::new(1, 2, 0))
            .type_ref(1, "Api", "Entry")
            .type_ref(2, "Other", "Kept")
            .type_ref(3, "Api", "More")
            .type_ref(0, "", "")
            .build_unit()
            .unwrap();
        let targets = vec![target("Platform.Core"), target("Platform.Extras")];
        let mut log = RewriteLog::new();

        let outcome = transplant_references(
            &mut unit,
            &targets,
            &[
                "Legacy.Platform".to_string(),
                "Legacy.Platform.x64".to_string(),
            ],
            &mut log,
        )
        .unwrap();

        assert_eq!(outcome.removed, 2);
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.target_ref_rids, vec![2, 3]);

        let names: Vec<&str> = unit.module_refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Keep.Me", "Platform.Core", "Platform.Extras"]);

        // Stripped scopes drop to zero, surviving ones compact.
        let scopes: Vec<u32> = unit.type_refs.iter().map(|t| t.scope).collect();
        assert_eq!(scopes, vec![0, 1, 0, 0]);

        // Detached sites remember the name they pointed at; the site that
        // was already unresolved does not.
        assert_eq!(outcome.detached.get(&0).map(String::as_str), Some("Legacy.Platform"));
        assert_eq!(outcome.detached.get(&2).map(String::as_str), Some("Legacy.Platform.x64"));
        assert!(!outcome.detached.contains_key(&1));
        assert!(!outcome.detached.contains_key(&3));

        let rendered: Vec<String> = log.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "removing reference to Legacy.Platform",
                "removing reference to Legacy.Platform.x64",
                "adding reference to Platform.Core",
                "adding reference to Platform.Extras",
            ]
        );
    }

    #[test]
    fn duplicate_rows_each_get_a_notice() {
        let mut unit = ModuleBuilder::new("Subject")
            .module_ref("Legacy.Platform", ModuleVersion::new(1, 0, 0))
            .module_ref("Legacy.Platform", ModuleVersion::new(1, 1, 0))
            .build_unit()
            .unwrap();
        let targets = vec![target("Platform.Core")];
        let mut log = RewriteLog::new();

        let outcome = transplant_references(
            &mut unit,
            &targets,
            &["Legacy.Platform".to_string()],
            &mut log,
        )
        .unwrap();

        assert_eq!(outcome.removed, 2);
        assert_eq!(unit.module_refs.len(), 1);
        assert_eq!(log.len(), 3);
    }
}
