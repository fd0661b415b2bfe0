//! Module cache
//!
//! Caches parsed modules to avoid re-parsing the same file multiple times.

use crate::resolver::ModuleId;
use crate::Module;
use rustc_hash::FxHashMap;

/// Cache for parsed modules
#[derive(Debug, Clone)]
pub struct ModuleCache {
    modules: FxHashMap<ModuleId, Module>,
}

impl ModuleCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            modules: FxHashMap::default(),
        }
    }

    /// Insert a module into the cache
    pub fn insert(&mut self, id: ModuleId, module: Module) {
        self.modules.insert(id, module);
    }

    /// Get a module from the cache
    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(&id)
    }

    /// Check if a module is in the cache
    pub fn contains(&self, id: ModuleId) -> bool {
        self.modules.contains_key(&id)
    }

    /// Remove a module from the cache
    pub fn remove(&mut self, id: ModuleId) -> Option<Module> {
        self.modules.remove(&id)
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.modules.clear();
    }

    /// Get the number of cached modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterate over all cached modules
    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &Module)> {
        self.modules.iter()
    }

    /// Get all module IDs in the cache
    pub fn module_ids(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.modules.keys().copied()
    }

    /// Get all modules in the cache
    pub fn modules(&self) -> impl Iterator<Item = &Module> + '_ {
        self.modules.values()
    }
}

impl Default for ModuleCache {
    fn default() -> Self {
        Self::new()
    }
}
