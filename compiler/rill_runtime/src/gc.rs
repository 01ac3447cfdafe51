//! Garbage-collector root registration seam.
//!
//! The collector's algorithm is external; the interpreter only
//! participates in its root-registration protocol. Frame storage and
//! temporary argument buffers are registered for the full duration of a
//! call through [`RootScope`], whose drop guarantees the matching pop on
//! both the return path and the unwind path.

use std::sync::atomic::{AtomicUsize, Ordering};

/// The collector's root-registration interface.
pub trait RootSet: Send + Sync {
    /// Register a block of `count` value cells as roots.
    fn push_roots(&self, count: usize);
    /// Unregister the most recently registered block.
    fn pop_roots(&self);
}

/// Root set for running without a collector.
#[derive(Default)]
pub struct NoopRootSet;

impl RootSet for NoopRootSet {
    fn push_roots(&self, _count: usize) {}
    fn pop_roots(&self) {}
}

/// Root set that counts push/pop pairs; used in tests to verify the
/// scoped-acquisition discipline holds across unwinds.
#[derive(Default)]
pub struct CountingRootSet {
    pushes: AtomicUsize,
    pops: AtomicUsize,
}

impl CountingRootSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pushes(&self) -> usize {
        self.pushes.load(Ordering::Acquire)
    }

    pub fn pops(&self) -> usize {
        self.pops.load(Ordering::Acquire)
    }

    /// Whether every push has been matched by a pop.
    pub fn is_balanced(&self) -> bool {
        self.pushes() == self.pops()
    }
}

impl RootSet for CountingRootSet {
    fn push_roots(&self, _count: usize) {
        self.pushes.fetch_add(1, Ordering::AcqRel);
    }

    fn pop_roots(&self) {
        self.pops.fetch_add(1, Ordering::AcqRel);
    }
}

/// Scoped root registration: pushes on creation, pops on drop.
pub struct RootScope<'a> {
    roots: &'a dyn RootSet,
}

impl<'a> RootScope<'a> {
    pub fn new(roots: &'a dyn RootSet, count: usize) -> Self {
        roots.push_roots(count);
        RootScope { roots }
    }
}

impl Drop for RootScope<'_> {
    fn drop(&mut self) {
        self.roots.pop_roots();
    }
}
