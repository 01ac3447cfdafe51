//! Module identifier.

use std::fmt;

/// Identifier of a module in the runtime's module registry.
///
/// The registry itself lives in `rill_runtime`; the IR only references
/// modules by id (global references, defining module of a method).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ModuleId(u32);

impl ModuleId {
    /// The root module, always present in a registry.
    pub const ROOT: ModuleId = ModuleId(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        ModuleId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}
