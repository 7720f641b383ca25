//! Type reference scope rewriting.
//!
//! After transplanting, every type reference site whose full name the
//! symbol index knows is repointed at the canonical reference of its
//! defining target. Sites are visited in ascending full-name order, stable
//! for duplicates, and notices are deduplicated against the previously
//! visited name: a hundred sites naming one type produce one notice but
//! all hundred scope columns are rewritten.

use std::collections::HashMap;

use crate::{
    metadata::image::ModuleUnit,
    rewrite::{
        events::{RewriteEvent, RewriteSink},
        symbols::{SymbolIndex, TargetModule},
    },
};

/// Repoints resolvable type reference sites at their defining targets.
///
/// A site is left alone when its name is empty, falls under a configured
/// skip prefix, or is unknown to the index. Failure to resolve is not an
/// error; the site simply keeps its current scope.
///
/// `detached` supplies the former scope names of sites the transplant left
/// at 0, so notices can say where a site used to point.
///
/// Returns the number of sites rewritten.
pub(crate) fn rewrite_type_scopes(
    unit: &mut ModuleUnit,
    index: &SymbolIndex,
    targets: &[TargetModule],
    target_ref_rids: &[u32],
    detached: &HashMap<usize, String>,
    skip_prefixes: &[String],
    sink: &mut dyn RewriteSink,
) -> usize {
    let mut order: Vec<(String, usize)> = unit
        .type_refs
        .iter()
        .enumerate()
        .map(|(i, site)| (site.full_name(), i))
        .collect();
    order.sort_by(|a, b| a.0.cmp(&b.0));

    let mut previous: Option<String> = None;
    let mut rewritten = 0;

    for (full_name, i) in order {
        let first_visit = previous.as_deref() != Some(full_name.as_str());

        if let Some((new_scope, target_name)) =
            resolve_site(&full_name, index, targets, target_ref_rids, skip_prefixes)
        {
            let old_scope = unit.type_refs[i].scope;
            let from = match old_scope {
                0 => detached.get(&i).cloned(),
                rid => unit
                    .module_refs
                    .get(rid as usize - 1)
                    .map(|r| r.name.clone()),
            };

            unit.type_refs[i].scope = new_scope;
            rewritten += 1;

            if first_visit {
                sink.record(RewriteEvent::TypeRedirected {
                    full_name: full_name.clone(),
                    from,
                    to: target_name.to_string(),
                });
            }
        }

        previous = Some(full_name);
    }

    rewritten
}

/// Decides whether a site gets rewritten and to what.
///
/// Returns the canonical scope RID and the owning target's name, or `None`
/// when the site is skipped.
fn resolve_site<'a>(
    full_name: &str,
    index: &SymbolIndex,
    targets: &'a [TargetModule],
    target_ref_rids: &[u32],
    skip_prefixes: &[String],
) -> Option<(u32, &'a str)> {
    if full_name.is_empty() {
        return None;
    }
    if skip_prefixes.iter().any(|p| full_name.starts_with(p.as_str())) {
        return None;
    }
    let position = index.resolve(full_name)?;
    let new_scope = target_ref_rids.get(position).copied()?;
    let target = targets.get(position)?;
    Some((new_scope, target.name()))
}
