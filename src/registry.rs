//! Process-wide registry of fault point modules.
//!
//! The registry is an append-only singly linked list of [`ModuleTable`]s, in
//! registration order. Linking is lock-free: a thread walks the list and
//! either meets the table it wants to add (already linked, nothing to do) or
//! installs it in the null tail slot with a compare-and-swap, walking on if
//! another thread won that slot first. Concurrent registrations of the same
//! table therefore converge on a single link.
//!
//! Tables declared with [`fault_module!`](crate::fault_module) are submitted
//! to `inventory` and linked the first time the global registry is queried,
//! or earlier if one of their points is touched directly. Components loaded
//! later are picked up by the next query.

use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::config;
use crate::module::{ModuleTable, load_link};
use crate::point::FaultPoint;
use crate::points::Points;

/// Load-time submission of a module table.
///
/// Emitted by [`fault_module!`](crate::fault_module); not meant to be built
/// by hand.
#[doc(hidden)]
#[derive(Debug)]
pub struct ModuleRegistration(pub &'static ModuleTable);

impl ModuleRegistration {
    pub const fn new(table: &'static ModuleTable) -> Self {
        Self(table)
    }
}

inventory::collect!(ModuleRegistration);

static GLOBAL: Registry = Registry {
    head: AtomicPtr::new(ptr::null_mut()),
    apply_env: true,
};

/// Returns the process-wide registry.
///
/// Every table submitted through [`fault_module!`](crate::fault_module) so far
/// is linked before the reference is returned.
pub fn registry() -> &'static Registry {
    for submitted in inventory::iter::<ModuleRegistration> {
        GLOBAL.register(submitted.0);
    }
    &GLOBAL
}

/// Link `table` into the process-wide registry.
///
/// Idempotent: the table ends up linked exactly once however many times, and
/// from however many threads, this is called. Returns `true` only for the call
/// that linked it.
pub fn register_module(table: &'static ModuleTable) -> bool {
    GLOBAL.register(table)
}

/// Look a point up by namespace and name in the process-wide registry.
///
/// Unknown names yield `None`; every control operation accepts that `None`
/// and treats it as a permanently inactive point.
pub fn find(namespace: &str, name: &str) -> Option<&'static FaultPoint> {
    registry().find(namespace, name)
}

/// Every point in every registered module.
pub fn points() -> Points<'static> {
    registry().points()
}

/// An ordered collection of linked module tables.
#[derive(Debug)]
pub struct Registry {
    head: AtomicPtr<ModuleTable>,
    /// Apply `FAULT_POINTS` directives to newly linked modules.
    apply_env: bool,
}

impl Registry {
    /// A registry detached from the process-wide one.
    ///
    /// A table can belong to one registry only; once linked here it is
    /// ignored by every other registry.
    pub(crate) const fn new() -> Self {
        Self {
            head: AtomicPtr::new(ptr::null_mut()),
            apply_env: false,
        }
    }

    /// Link `table` unless it is already linked or marked registered.
    pub fn register(&self, table: &'static ModuleTable) -> bool {
        if table.is_registered() {
            return false;
        }
        if !self.link(table) {
            return false;
        }
        table.mark_registered();

        tracing::debug!(
            points = table.points().count(),
            namespaces = ?namespaces(table),
            "linked fault point module"
        );
        self.warn_duplicates(table);
        if self.apply_env {
            config::apply_env_to(table);
        }
        true
    }

    fn link(&self, table: &'static ModuleTable) -> bool {
        let new = ptr::from_ref(table).cast_mut();
        let mut slot = &self.head;
        loop {
            match load_link(slot) {
                Some(linked) if ptr::eq(linked, table) => return false,
                Some(linked) => slot = linked.next_slot(),
                None => {
                    match slot.compare_exchange(
                        ptr::null_mut(),
                        new,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    ) {
                        Ok(_) => return true,
                        // Lost the tail to another registration; re-read the
                        // slot and keep walking.
                        Err(_) => continue,
                    }
                }
            }
        }
    }

    fn warn_duplicates(&self, table: &'static ModuleTable) {
        for point in table.points() {
            let first = self.find(point.namespace(), point.name());
            if first.is_some_and(|first| !ptr::eq(first, point)) {
                tracing::warn!(
                    namespace = point.namespace(),
                    name = point.name(),
                    "fault point declared more than once; lookups resolve to the first registration"
                );
            }
        }
    }

    /// First registered table, if any.
    pub(crate) fn head(&self) -> Option<&'static ModuleTable> {
        load_link(&self.head)
    }

    /// Linked tables in registration order.
    pub fn modules(&self) -> Modules {
        Modules { next: self.head() }
    }

    /// Every point of every linked table.
    pub fn points(&self) -> Points<'_> {
        Points::new(self)
    }

    /// First point named `namespace::name`, in registration then declaration
    /// order.
    pub fn find(&self, namespace: &str, name: &str) -> Option<&'static FaultPoint> {
        self.points()
            .iter_mut()
            .find(|point| point.matches(namespace, name))
    }
}

/// Iterator over linked module tables.
#[derive(Debug, Clone)]
pub struct Modules {
    next: Option<&'static ModuleTable>,
}

impl Iterator for Modules {
    type Item = &'static ModuleTable;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next();
        Some(current)
    }
}

fn namespaces(table: &ModuleTable) -> Vec<&'static str> {
    let mut seen: Vec<&'static str> = Vec::new();
    for point in table.points() {
        if !seen.contains(&point.namespace()) {
            seen.push(point.namespace());
        }
    }
    seen
}
