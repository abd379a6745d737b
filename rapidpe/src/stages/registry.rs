//! Registry of follow-up methods.

use super::{CohPtfMethod, FollowupMethod};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps method identifiers to implementations.
#[derive(Default)]
pub struct MethodRegistry {
    methods: RwLock<BTreeMap<String, Arc<dyn FollowupMethod>>>,
}

impl MethodRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in method.
    #[must_use]
    pub fn with_builtin_methods() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(CohPtfMethod));
        registry
    }

    /// Registers a method under its identifier, returning any method it replaced.
    pub fn register(&self, method: Arc<dyn FollowupMethod>) -> Option<Arc<dyn FollowupMethod>> {
        let id = method.identifier().to_string();
        self.methods.write().insert(id, method)
    }

    /// Gets a method by identifier.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<Arc<dyn FollowupMethod>> {
        self.methods.read().get(identifier).cloned()
    }

    /// Checks if an identifier is registered.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.methods.read().contains_key(identifier)
    }

    /// Registered identifiers in sorted order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        self.methods.read().keys().cloned().collect()
    }

    /// Number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.read().is_empty()
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.identifiers())
            .finish()
    }
}
