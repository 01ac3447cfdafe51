//! The aggregate runtime a single interpreter instance executes against.

use std::sync::Arc;

use rill_ir::{Name, SharedInterner};

use crate::core_types::CoreTypes;
use crate::gc::{NoopRootSet, RootSet};
use crate::modules::ModuleRegistry;

/// Global mutable state shared by every call: the module registry (with
/// the ambient current-module context), the core types, and the GC root
/// set. One `Runtime` per process in normal use; tests build throwaway
/// instances.
pub struct Runtime {
    pub interner: SharedInterner,
    pub modules: ModuleRegistry,
    pub core: CoreTypes,
    pub roots: Arc<dyn RootSet>,
}

impl Runtime {
    /// Build a runtime with a root module named `Main` and no collector.
    pub fn new(interner: SharedInterner) -> Self {
        Runtime::with_roots(interner, Arc::new(NoopRootSet))
    }

    /// Build a runtime with an explicit root set.
    pub fn with_roots(interner: SharedInterner, roots: Arc<dyn RootSet>) -> Self {
        let core = CoreTypes::new(&interner);
        let root_name = interner.intern("Main");
        Runtime {
            modules: ModuleRegistry::new(root_name),
            core,
            roots,
            interner,
        }
    }

    /// Render a name for diagnostics.
    pub fn name_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }
}
