//! Loaded target modules and the symbol index over their types.
//!
//! A [`TargetModule`] keeps a loaded image together with its canonical
//! identity and the set of type names other modules can reach. The
//! [`SymbolIndex`] merges those sets into one lock-free map from full type
//! name to the position of the defining target, which is the only lookup
//! the rewrite passes need.
//!
//! Indexing is last-write-wins: when two targets define the same full name,
//! the later one in configuration order owns the entry.

use std::collections::BTreeMap;
use std::sync::Arc;

use crossbeam_skiplist::SkipMap;

use crate::{
    metadata::{
        identity::ModuleIdentity,
        image::{ModuleImage, ModuleUnit},
        tables::{MemberFlags, TypeFlags},
    },
    rewrite::registry::IdentityRegistry,
    Error, Result,
};

/// Position of a type definition inside a target image.
#[derive(Debug, Clone, Copy)]
struct TypeLocation {
    unit: usize,
    rid: u32,
}

/// A target module loaded for indexing.
///
/// Holds the full image (member resolution needs the definition rows), the
/// canonical identity stamped into rewritten references, and the reachable
/// type names contributed to the [`SymbolIndex`].
#[derive(Debug)]
pub struct TargetModule {
    image: ModuleImage,
    identity: Arc<ModuleIdentity>,
    types: BTreeMap<String, TypeLocation>,
}

impl TargetModule {
    /// Loads a target from a parsed image, deriving its identity through
    /// the registry.
    ///
    /// All units contribute type names; the identity comes from the first
    /// unit's module definition row.
    ///
    /// # Errors
    /// Returns an error if the identity cannot be derived, for example when
    /// the module declares an unknown hash algorithm for its key.
    pub(crate) fn load(image: ModuleImage, registry: &IdentityRegistry) -> Result<Self> {
        let module = &image.units().first().ok_or(Error::Empty)?.module;
        let identity = registry.identity_of(module)?;

        let mut types = BTreeMap::new();
        for (u, unit) in image.units().iter().enumerate() {
            for rid in 1..=unit.type_defs.len() as u32 {
                if !indexable(unit, rid) {
                    continue;
                }
                let Some(full_name) = unit.type_def_full_name(rid) else {
                    continue;
                };
                types.insert(full_name, TypeLocation { unit: u, rid });
            }
        }

        Ok(TargetModule {
            image,
            identity,
            types,
        })
    }

    /// Returns the module's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Returns the module's canonical identity.
    #[must_use]
    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// Returns the loaded image.
    #[must_use]
    pub fn image(&self) -> &ModuleImage {
        &self.image
    }

    /// Returns `true` if this target defines the named reachable type.
    #[must_use]
    pub fn defines_type(&self, full_name: &str) -> bool {
        self.types.contains_key(full_name)
    }

    /// Iterates over the reachable type names, sorted ascending.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Returns `true` if the named type defines a public member with the
    /// given name and exact signature bytes.
    ///
    /// This is the membership half of resolution simulation: a member
    /// reference resolves when the index knows its declaring type and this
    /// check passes against the owning target.
    #[must_use]
    pub fn has_public_member(&self, type_name: &str, member: &str, signature: &[u8]) -> bool {
        let Some(location) = self.types.get(type_name) else {
            return false;
        };
        let Some(unit) = self.image.units().get(location.unit) else {
            return false;
        };
        unit.member_defs.iter().any(|m| {
            m.owner == location.rid
                && m.flags.contains(MemberFlags::PUBLIC)
                && m.name == member
                && m.signature == signature
        })
    }
}

/// Decides whether a type definition is reachable from other modules.
///
/// Every definition on the enclosing chain must be public and none may be
/// synthetic; the outermost namespace must not carry a generated-code
/// marker. The chain walk is bounded because valid rows always precede the
/// rows they enclose.
fn indexable(unit: &ModuleUnit, rid: u32) -> bool {
    let mut current = rid;
    for _ in 0..=unit.type_defs.len() {
        let Some(def) = unit.type_defs.get(current as usize - 1) else {
            return false;
        };
        if !def.flags.contains(TypeFlags::PUBLIC) || def.flags.contains(TypeFlags::SYNTHETIC) {
            return false;
        }
        if def.enclosing == 0 {
            return !def.namespace.contains('<');
        }
        if def.enclosing >= current {
            return false;
        }
        current = def.enclosing;
    }
    false
}

/// Lock-free map from full type name to the index of the defining target.
///
/// Built once per engine from the configured targets, in order; an insert
/// for an existing name replaces the previous entry, so the last target
/// defining a name owns it.
#[derive(Debug)]
pub struct SymbolIndex {
    map: SkipMap<String, usize>,
}

impl SymbolIndex {
    /// Builds the index over the given targets, in configuration order.
    #[must_use]
    pub fn build(targets: &[TargetModule]) -> Self {
        let map = SkipMap::new();
        for (position, target) in targets.iter().enumerate() {
            for name in target.type_names() {
                map.insert(name.to_string(), position);
            }
        }
        SymbolIndex { map }
    }

    /// Resolves a full type name to the position of the target defining it.
    #[must_use]
    pub fn resolve(&self, full_name: &str) -> Option<usize> {
        self.map.get(full_name).map(|entry| *entry.value())
    }

    /// Returns `true` if the index knows the given full name.
    #[must_use]
    pub fn contains(&self, full_name: &str) -> bool {
        self.map.contains_key(full_name)
    }

    /// Returns the number of indexed type names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no type names are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over the indexed entries in name order.
    pub fn iter(&self) -> crossbeam_skiplist::map::Iter<'_, String, usize> {
        self.map.iter()
    }
}
