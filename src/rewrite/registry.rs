//! Per-engine cache of derived module identities.
//!
//! Deriving an identity hashes the module's public key down to its token,
//! which is cheap but not free; targets are consulted repeatedly during a
//! run and across parallel runs. The registry derives each identity once
//! and hands out shared descriptors after that. Each engine owns its own
//! registry, so independent engines never share state.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    metadata::{identity::ModuleIdentity, tables::Module},
    Result,
};

/// Concurrent cache mapping module names to their canonical identities.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    cache: DashMap<String, Arc<ModuleIdentity>>,
}

impl IdentityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        IdentityRegistry {
            cache: DashMap::new(),
        }
    }

    /// Returns the canonical identity for a module, deriving and caching it
    /// on first sight of the module's name.
    ///
    /// # Arguments
    ///
    /// * `module` - The module definition row to derive the identity from
    ///
    /// # Errors
    /// Returns an error if key token derivation fails, for example when the
    /// module declares an unknown hash algorithm.
    pub fn identity_of(&self, module: &Module) -> Result<Arc<ModuleIdentity>> {
        if let Some(hit) = self.cache.get(&module.name) {
            return Ok(Arc::clone(&hit));
        }

        let identity = Arc::new(ModuleIdentity::from_module(module)?);
        self.cache
            .insert(module.name.clone(), Arc::clone(&identity));
        Ok(identity)
    }

    /// Returns the number of cached identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{builder::ModuleBuilder, identity::KeyIdentity};

    #[test]
    fn caches_one_identity_per_module_name() {
        let registry = IdentityRegistry::new();
        let unit = ModuleBuilder::new("Platform.Core")
            .version(2, 0, 0)
            .public_key(&[0xAA; 32])
            .build_unit()
            .unwrap();

        let first = registry.identity_of(&unit.module).unwrap();
        let second = registry.identity_of(&unit.module).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert!(matches!(first.key, Some(KeyIdentity::Token(_))));
    }

    #[test]
    fn distinct_names_get_distinct_entries() {
        let registry = IdentityRegistry::new();
        let a = ModuleBuilder::new("A").build_unit().unwrap();
        let b = ModuleBuilder::new("B").build_unit().unwrap();

        registry.identity_of(&a.module).unwrap();
        registry.identity_of(&b.module).unwrap();
        assert_eq!(registry.len(), 2);
    }
}
