//! Facade member mappings and the member reference pass.
//!
//! Target modules sometimes replace an API member rather than move it: a
//! property becomes a static method, a helper migrates to a shim type. The
//! facade table maps an original member site ([`MemberKey`]) to its
//! replacement ([`MemberMapping`]), and the member pass rewrites matching
//! call sites after the type scope walk has run.
//!
//! A mapping is either unconditional or gated: gated mappings apply only
//! when the original member no longer resolves against the indexed targets,
//! so sites that still work are left untouched.

use std::collections::HashMap;

use crate::{
    metadata::{image::ModuleUnit, tables::TypeRef},
    rewrite::{
        events::{RewriteEvent, RewriteSink},
        symbols::{SymbolIndex, TargetModule},
    },
};

/// Identifies one member as call sites name it: declaring type, member name,
/// and the exact signature blob the site was compiled against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    /// Full name of the declaring type.
    pub type_name: String,
    /// Member name.
    pub member: String,
    /// Signature blob, compared byte-for-byte.
    pub signature: Vec<u8>,
}

impl MemberKey {
    /// Creates a member key.
    ///
    /// # Arguments
    ///
    /// * `type_name` - Full name of the declaring type
    /// * `member` - Member name
    /// * `signature` - Signature blob the call site carries
    #[must_use]
    pub fn new(type_name: impl Into<String>, member: impl Into<String>, signature: Vec<u8>) -> Self {
        MemberKey {
            type_name: type_name.into(),
            member: member.into(),
            signature,
        }
    }
}

/// Replacement entry for one facade mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberMapping {
    /// The member call sites are redirected to.
    pub replacement: MemberKey,
    /// When `true`, the redirect applies only if the original member fails
    /// to resolve against the target modules. When `false`, every matching
    /// site is redirected.
    pub only_if_unresolved: bool,
}

/// Table of facade member mappings keyed by the original member.
#[derive(Debug, Clone, Default)]
pub struct FacadeMap {
    entries: HashMap<MemberKey, MemberMapping>,
}

impl FacadeMap {
    /// Starts building a facade table.
    #[must_use]
    pub fn builder() -> FacadeMapBuilder {
        FacadeMapBuilder::default()
    }

    /// Looks up the mapping for an original member, if one is configured.
    #[must_use]
    pub fn lookup(&self, key: &MemberKey) -> Option<&MemberMapping> {
        self.entries.get(key)
    }

    /// Iterates over all configured mappings.
    pub fn mappings(&self) -> impl Iterator<Item = (&MemberKey, &MemberMapping)> {
        self.entries.iter()
    }

    /// Returns the number of configured mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no mappings are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`FacadeMap`].
///
/// Later entries for the same original member replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct FacadeMapBuilder {
    entries: HashMap<MemberKey, MemberMapping>,
}

impl FacadeMapBuilder {
    /// Redirects every site naming `from` to `to`, unconditionally.
    #[must_use]
    pub fn redirect(mut self, from: MemberKey, to: MemberKey) -> Self {
        self.entries.insert(
            from,
            MemberMapping {
                replacement: to,
                only_if_unresolved: false,
            },
        );
        self
    }

    /// Redirects sites naming `from` to `to` only when `from` no longer
    /// resolves against the target modules.
    #[must_use]
    pub fn redirect_if_unresolved(mut self, from: MemberKey, to: MemberKey) -> Self {
        self.entries.insert(
            from,
            MemberMapping {
                replacement: to,
                only_if_unresolved: true,
            },
        );
        self
    }

    /// Finishes the table.
    #[must_use]
    pub fn finish(self) -> FacadeMap {
        FacadeMap {
            entries: self.entries,
        }
    }
}

/// Applies the facade table to the unit's member reference sites.
///
/// Sites are visited sorted by (declaring type full name, member name),
/// stable for equal keys. Dangling sites (class RID 0) and sites whose
/// declaring type cannot be named are left alone. Each decision is made
/// once per site and is terminal.
///
/// Returns the number of sites redirected.
pub(crate) fn rewrite_member_refs(
    unit: &mut ModuleUnit,
    index: &SymbolIndex,
    targets: &[TargetModule],
    target_ref_rids: &[u32],
    facades: &FacadeMap,
    sink: &mut dyn RewriteSink,
) -> usize {
    if facades.is_empty() {
        return 0;
    }

    let mut order: Vec<(String, String, usize)> = Vec::with_capacity(unit.member_refs.len());
    for (i, site) in unit.member_refs.iter().enumerate() {
        if site.class == 0 {
            continue;
        }
        let Some(class_name) = unit.type_ref_full_name(site.class) else {
            continue;
        };
        order.push((class_name, site.name.clone(), i));
    }
    order.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));

    let mut previous: Option<(String, String)> = None;
    let mut redirected = 0;

    for (class_name, member_name, i) in order {
        let first_visit = match &previous {
            Some((t, m)) => t != &class_name || m != &member_name,
            None => true,
        };

        let key = MemberKey {
            type_name: class_name.clone(),
            member: member_name.clone(),
            signature: unit.member_refs[i].signature.clone(),
        };

        if let Some(mapping) = facades.lookup(&key) {
            let applies = !mapping.only_if_unresolved || !original_resolves(index, targets, &key);
            if applies {
                let class_rid =
                    ensure_type_ref(unit, index, target_ref_rids, &mapping.replacement.type_name);
                let replacement = mapping.replacement.clone();

                let site = &mut unit.member_refs[i];
                site.class = class_rid;
                site.name = replacement.member.clone();
                site.signature = replacement.signature;
                redirected += 1;

                if first_visit {
                    sink.record(RewriteEvent::MemberRedirected {
                        type_name: class_name.clone(),
                        member: member_name.clone(),
                        to_type: replacement.type_name,
                        to_member: replacement.member,
                    });
                }
            }
        }

        previous = Some((class_name, member_name));
    }

    redirected
}

/// Simulates resolution of the original, unmodified member reference.
///
/// Resolution succeeds when the symbol index knows the declaring type and
/// the owning target defines a public member with the same name and the
/// exact same signature bytes.
fn original_resolves(index: &SymbolIndex, targets: &[TargetModule], key: &MemberKey) -> bool {
    match index.resolve(&key.type_name) {
        Some(t) => targets
            .get(t)
            .is_some_and(|target| target.has_public_member(&key.type_name, &key.member, &key.signature)),
        None => false,
    }
}

/// Returns the RID of a type reference site naming `full_name`, importing
/// one if the unit has none.
///
/// Imported rows take their scope from the symbol index; a replacement type
/// no target defines is left at scope 0, though engine construction rejects
/// such mappings before a rewrite can reach this point.
fn ensure_type_ref(
    unit: &mut ModuleUnit,
    index: &SymbolIndex,
    target_ref_rids: &[u32],
    full_name: &str,
) -> u32 {
    for (i, site) in unit.type_refs.iter().enumerate() {
        if site.full_name() == full_name {
            return i as u32 + 1;
        }
    }

    let scope = index
        .resolve(full_name)
        .and_then(|t| target_ref_rids.get(t).copied())
        .unwrap_or(0);
    let (namespace, name) = split_full_name(full_name);
    unit.type_refs.push(TypeRef {
        scope,
        name,
        namespace,
    });
    unit.type_refs.len() as u32
}

/// Splits a full type name into (namespace, name).
///
/// The namespace is everything before the last dot that precedes the first
/// nesting separator; a nested chain stays in the name, e.g.
/// `"Ns.Outer/Inner"` splits into `("Ns", "Outer/Inner")`.
fn split_full_name(full: &str) -> (String, String) {
    let head = &full[..full.find('/').unwrap_or(full.len())];
    match head.rfind('.') {
        Some(dot) => (full[..dot].to_string(), full[dot + 1..].to_string()),
        None => (String::new(), full.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::builder::ModuleBuilder;
    use crate::metadata::identity::ModuleVersion;

    #[test]
    fn split_full_name_variants() {
        assert_eq!(
            split_full_name("Host.Api.Widget"),
            ("Host.Api".to_string(), "Widget".to_string())
        );
        assert_eq!(split_full_name("Widget"), (String::new(), "Widget".to_string()));
        assert_eq!(
            split_full_name("Ns.Outer/Inner"),
            ("Ns".to_string(), "Outer/Inner".to_string())
        );
        assert_eq!(
            split_full_name("Outer/Inner"),
            (String::new(), "Outer/Inner".to_string())
        );
    }

    #[test]
    fn builder_last_entry_wins() {
        let original = MemberKey::new("Host.Game", "get_Items", vec![0x28, 0x1C]);
        let first = MemberKey::new("Host.Shims", "First", vec![0x00, 0x1C]);
        let second = MemberKey::new("Host.Shims", "Second", vec![0x00, 0x1C]);

        let map = FacadeMap::builder()
            .redirect(original.clone(), first)
            .redirect_if_unresolved(original.clone(), second.clone())
            .finish();

        assert_eq!(map.len(), 1);
        let mapping = map.lookup(&original).unwrap();
        assert_eq!(mapping.replacement, second);
        assert!(mapping.only_if_unresolved);

        let other = MemberKey::new("Host.Game", "get_Items", vec![0x99]);
        assert!(map.lookup(&other).is_none());
    }

    #[test]
    fn ensure_type_ref_reuses_existing_row() {
        let mut unit = ModuleBuilder::new("Subject")
            .module_ref("Platform.Core", ModuleVersion::new(1, 0, 0))
            .type_ref(1, "Host.Api", "Widget")
            .build_unit()
            .unwrap();

        let index = SymbolIndex::build(&[]);
        assert_eq!(ensure_type_ref(&mut unit, &index, &[], "Host.Api.Widget"), 1);
        assert_eq!(unit.type_refs.len(), 1);

        let rid = ensure_type_ref(&mut unit, &index, &[], "Host.Api.Gadget");
        assert_eq!(rid, 2);
        assert_eq!(unit.type_refs.len(), 2);
        let added = &unit.type_refs[1];
        assert_eq!(added.namespace, "Host.Api");
        assert_eq!(added.name, "Gadget");
        assert_eq!(added.scope, 0);
    }
}
