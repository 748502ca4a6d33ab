//! Per-component tables of fault points.

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

use crate::point::FaultPoint;

/// The fault points contributed by one component.
///
/// Slots are kept in declaration order. A `None` slot is a placeholder and is
/// skipped by lookups and iteration. Tables are only ever linked by
/// reference: the registry never copies a descriptor.
///
/// Usually declared through [`fault_module!`](crate::fault_module), which also
/// arranges for the table to be discovered at load time.
#[derive(Debug)]
pub struct ModuleTable {
    slots: &'static [Option<&'static FaultPoint>],
    registered: AtomicBool,
    next: AtomicPtr<ModuleTable>,
}

impl ModuleTable {
    pub const fn new(slots: &'static [Option<&'static FaultPoint>]) -> Self {
        Self {
            slots,
            registered: AtomicBool::new(false),
            next: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Raw slots, placeholders included.
    pub fn slots(&self) -> &'static [Option<&'static FaultPoint>] {
        self.slots
    }

    /// Declared points, placeholders skipped.
    pub fn points(&self) -> impl Iterator<Item = &'static FaultPoint> + use<> {
        self.slots.iter().filter_map(|slot| *slot)
    }

    /// `true` when the table has no declared point.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Whether the table has been linked into a registry.
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    pub(crate) fn mark_registered(&self) {
        self.registered.store(true, Ordering::Release);
    }

    /// Link slot holding the table registered after this one.
    pub(crate) fn next_slot(&self) -> &AtomicPtr<ModuleTable> {
        &self.next
    }

    /// Table registered right after this one.
    pub(crate) fn next(&self) -> Option<&'static ModuleTable> {
        load_link(&self.next)
    }
}

/// Follow a link slot.
pub(crate) fn load_link(slot: &AtomicPtr<ModuleTable>) -> Option<&'static ModuleTable> {
    let raw = slot.load(Ordering::Acquire);
    // SAFETY: link slots are only ever written by `Registry::link`, which
    // stores pointers derived from `&'static ModuleTable`.
    unsafe { raw.cast_const().as_ref() }
}
