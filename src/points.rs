//! Traversal over every registered fault point.
//!
//! Iteration visits modules in registration order and points in declaration
//! order, skipping empty tables and placeholder slots. Iterators are
//! forward-only; restart by asking [`Points`] for a fresh one.
//!
//! [`IterMut`] hands out the descriptors themselves, so callers can toggle
//! points while walking. [`Iter`] hands out a [`PointView`] that only reads.
//! An `IterMut` converts into an `Iter`, never the other way round.

use std::iter::FusedIterator;
use std::ptr;

use crate::module::ModuleTable;
use crate::point::{FaultPoint, Mode};
use crate::registry::Registry;

/// Every point of every module linked into a registry.
#[derive(Debug, Clone, Copy)]
pub struct Points<'r> {
    registry: &'r Registry,
}

impl<'r> Points<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Read-only traversal.
    pub fn iter(&self) -> Iter {
        Iter {
            cursor: Cursor::start(self.registry.head()),
        }
    }

    /// Traversal yielding descriptors that can be activated and deactivated.
    pub fn iter_mut(&self) -> IterMut {
        IterMut {
            cursor: Cursor::start(self.registry.head()),
        }
    }

    /// The exhausted position every iterator ends at.
    pub fn end() -> Iter {
        Iter { cursor: Cursor::END }
    }

    /// Number of declared points.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Deactivate every point. Modes and error codes are left untouched.
    pub fn deactivate_all(&self) {
        self.iter_mut().for_each(FaultPoint::deactivate);
    }
}

impl IntoIterator for Points<'_> {
    type Item = &'static FaultPoint;
    type IntoIter = IterMut;

    fn into_iter(self) -> IterMut {
        self.iter_mut()
    }
}

/// Position within the module chain: a table and a slot inside it.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    table: Option<&'static ModuleTable>,
    slot: usize,
}

impl Cursor {
    const END: Cursor = Cursor {
        table: None,
        slot: 0,
    };

    fn start(head: Option<&'static ModuleTable>) -> Self {
        let mut cursor = Cursor {
            table: head,
            slot: 0,
        };
        cursor.settle();
        cursor
    }

    /// Move forward until the cursor rests on a declared point or the end.
    fn settle(&mut self) {
        while let Some(table) = self.table {
            match table.slots().get(self.slot) {
                Some(Some(_)) => return,
                Some(None) => self.slot += 1,
                None => {
                    self.table = table.next();
                    self.slot = 0;
                }
            }
        }
        *self = Cursor::END;
    }

    fn current(&self) -> Option<&'static FaultPoint> {
        self.table?.slots().get(self.slot).copied().flatten()
    }

    fn advance(&mut self) {
        if self.table.is_some() {
            self.slot += 1;
            self.settle();
        }
    }

    fn next_point(&mut self) -> Option<&'static FaultPoint> {
        let point = self.current()?;
        self.advance();
        Some(point)
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        let same_table = match (self.table, other.table) {
            (Some(a), Some(b)) => ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_table && self.slot == other.slot
    }
}

impl Eq for Cursor {}

/// Iterator yielding controllable descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterMut {
    cursor: Cursor,
}

impl IterMut {
    /// `true` once the iterator sits at the end position.
    pub fn is_end(&self) -> bool {
        self.cursor == Cursor::END
    }
}

impl Iterator for IterMut {
    type Item = &'static FaultPoint;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_point()
    }
}

impl FusedIterator for IterMut {}

/// Iterator yielding read-only views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iter {
    cursor: Cursor,
}

impl Iter {
    pub fn is_end(&self) -> bool {
        self.cursor == Cursor::END
    }
}

impl From<IterMut> for Iter {
    fn from(iter: IterMut) -> Self {
        Iter {
            cursor: iter.cursor,
        }
    }
}

impl PartialEq<IterMut> for Iter {
    fn eq(&self, other: &IterMut) -> bool {
        self.cursor == other.cursor
    }
}

impl Iterator for Iter {
    type Item = PointView;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_point().map(PointView)
    }
}

impl FusedIterator for Iter {}

/// Read-only access to a registered point.
#[derive(Debug, Clone, Copy)]
pub struct PointView(&'static FaultPoint);

impl PointView {
    pub fn namespace(&self) -> &'static str {
        self.0.namespace()
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn description(&self) -> &'static str {
        self.0.description()
    }

    pub fn layout_version(&self) -> u32 {
        self.0.layout_version()
    }

    pub fn is_active(&self) -> bool {
        self.0.is_active()
    }

    pub fn mode(&self) -> Mode {
        self.0.mode()
    }

    pub fn error_code(&self) -> i32 {
        self.0.error_code()
    }

    /// `true` if both views refer to the same descriptor.
    pub fn is(&self, point: &FaultPoint) -> bool {
        ptr::eq(self.0, point)
    }
}

impl From<&'static FaultPoint> for PointView {
    fn from(point: &'static FaultPoint) -> Self {
        PointView(point)
    }
}
