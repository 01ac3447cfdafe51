//! Modules and global bindings.
//!
//! A [`Binding`] is a named mutable cell scoped to a module, optionally
//! constant. Bindings are created on first write or explicit declaration
//! and never destroyed. The [`ModuleRegistry`] owns every module and also
//! carries the ambient "current module" context; entry points that change
//! the context do so through [`CurrentModuleGuard`], which restores the
//! prior module on every exit path, including unwinds.
//!
//! Access discipline: concurrent reads of a binding are fine, concurrent
//! redefinition of the same binding must be serialized by the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use rill_ir::errors::constant_redefinition;
use rill_ir::{EvalError, ModuleId, Name, Value};

/// A named storage cell in a module.
pub struct Binding {
    pub name: Name,
    value: RwLock<Option<Value>>,
    constant: AtomicBool,
}

impl Binding {
    fn new(name: Name) -> Self {
        Binding {
            name,
            value: RwLock::new(None),
            constant: AtomicBool::new(false),
        }
    }

    /// The current value, if assigned.
    pub fn value(&self) -> Option<Value> {
        self.value.read().clone()
    }

    /// Raw store, bypassing the constancy check.
    ///
    /// This is the speculative-install primitive used by type definitions:
    /// the caller saves the prior value, installs a provisional one, and is
    /// responsible for restoring on every path out of its rollback scope.
    pub fn store_raw(&self, value: Option<Value>) {
        *self.value.write() = value;
    }

    pub fn is_constant(&self) -> bool {
        self.constant.load(Ordering::Acquire)
    }

    /// Mark this binding constant. Later incompatible assignments fail.
    pub fn declare_constant(&self) {
        self.constant.store(true, Ordering::Release);
    }

    /// Assign enforcing constancy. Re-assigning a constant to an equal
    /// value is a no-op; anything else on a constant is an error.
    ///
    /// `name` is the binding's rendered name, for the error message.
    pub fn checked_assign(&self, value: Value, name: &str) -> Result<(), EvalError> {
        let mut cell = self.value.write();
        if self.is_constant() {
            match &*cell {
                Some(old) if *old == value => return Ok(()),
                Some(_) => return Err(constant_redefinition(name)),
                None => {}
            }
        }
        *cell = Some(value);
        Ok(())
    }
}

/// A module: a namespace of bindings.
pub struct Module {
    pub id: ModuleId,
    pub name: Name,
    bindings: RwLock<FxHashMap<Name, Arc<Binding>>>,
}

impl Module {
    fn new(id: ModuleId, name: Name) -> Self {
        Module {
            id,
            name,
            bindings: RwLock::new(FxHashMap::default()),
        }
    }

    /// Look up an existing binding.
    pub fn binding(&self, name: Name) -> Option<Arc<Binding>> {
        self.bindings.read().get(&name).cloned()
    }

    /// Get the binding for `name`, creating it unassigned if absent.
    pub fn binding_or_create(&self, name: Name) -> Arc<Binding> {
        if let Some(b) = self.binding(name) {
            return b;
        }
        let mut guard = self.bindings.write();
        guard
            .entry(name)
            .or_insert_with(|| Arc::new(Binding::new(name)))
            .clone()
    }

    /// Read a global's value, or `None` if unbound or unassigned.
    pub fn global(&self, name: Name) -> Option<Value> {
        self.binding(name).and_then(|b| b.value())
    }
}

/// Owns every module and the ambient current-module context.
pub struct ModuleRegistry {
    modules: RwLock<Vec<Arc<Module>>>,
    current: RwLock<ModuleId>,
}

impl ModuleRegistry {
    /// Create a registry with the root module present and current.
    pub fn new(root_name: Name) -> Self {
        let root = Arc::new(Module::new(ModuleId::ROOT, root_name));
        ModuleRegistry {
            modules: RwLock::new(vec![root]),
            current: RwLock::new(ModuleId::ROOT),
        }
    }

    /// Create a new module and return its id.
    pub fn define_module(&self, name: Name) -> ModuleId {
        let mut guard = self.modules.write();
        let id = ModuleId::new(u32::try_from(guard.len()).unwrap_or(u32::MAX));
        guard.push(Arc::new(Module::new(id, name)));
        id
    }

    /// Look up a module by id.
    pub fn module(&self, id: ModuleId) -> Option<Arc<Module>> {
        self.modules.read().get(id.raw() as usize).cloned()
    }

    /// The root module.
    pub fn root(&self) -> Arc<Module> {
        self.modules.read()[0].clone()
    }

    /// The ambient current module.
    pub fn current_module(&self) -> ModuleId {
        *self.current.read()
    }

    /// Set the ambient current module, returning the prior one.
    pub fn set_current_module(&self, id: ModuleId) -> ModuleId {
        let mut guard = self.current.write();
        std::mem::replace(&mut *guard, id)
    }

    /// Enter `id` as the current module until the guard drops.
    pub fn enter_module(&self, id: ModuleId) -> CurrentModuleGuard<'_> {
        let prior = self.set_current_module(id);
        CurrentModuleGuard {
            registry: self,
            prior,
        }
    }
}

/// Restores the prior current module on drop, so the ambient context is
/// rewound on both the success and the unwind path.
pub struct CurrentModuleGuard<'a> {
    registry: &'a ModuleRegistry,
    prior: ModuleId,
}

impl Drop for CurrentModuleGuard<'_> {
    fn drop(&mut self) {
        self.registry.set_current_module(self.prior);
    }
}
