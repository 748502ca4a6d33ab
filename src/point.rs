//! Fault point descriptors.
//!
//! A [`FaultPoint`] names one injection site and carries its mutable runtime
//! state. Descriptors are built with `const fn` constructors so they can live
//! in `static` items: their address never changes once handed to a
//! [`ModuleTable`](crate::ModuleTable).
//!
//! Two record layouts exist. Layout 0 predates the explicit version tag;
//! layout 1 is the current one. Both respond to the same accessors. A tag
//! newer than [`CURRENT_LAYOUT`] is accepted but the point is inert: it never
//! reads as active and ignores every mutator.
//!
//! A point declared through [`fault_module!`](crate::fault_module) knows its
//! table: the first state access on the point links that table into the
//! process-wide registry.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};

use crate::module::ModuleTable;
use crate::registry;

/// Tag of the legacy record layout (no explicit tag).
pub const LEGACY_LAYOUT: u32 = 0;

/// Highest layout tag understood by this build.
pub const CURRENT_LAYOUT: u32 = 1;

/// How an active point reacts to being consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Mode {
    /// Stays active across consumptions until deactivated.
    #[default]
    Multiple = 0,
    /// Deactivates itself on the first consumption.
    OneShot = 1,
}

impl Mode {
    #[inline]
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Mode::OneShot,
            _ => Mode::Multiple,
        }
    }
}

/// Runtime state shared by every supported layout.
///
/// Each field is individually atomic. Readers that need several fields may
/// observe a combination no single writer produced if more than one thread
/// mutates the same point.
#[derive(Debug)]
struct PointState {
    active: AtomicBool,
    mode: AtomicU8,
    error_code: AtomicI32,
}

impl PointState {
    const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            mode: AtomicU8::new(Mode::Multiple as u8),
            error_code: AtomicI32::new(0),
        }
    }
}

#[derive(Debug)]
enum Layout {
    /// Version 0.
    Legacy {
        namespace: &'static str,
        name: &'static str,
        description: &'static str,
        state: PointState,
    },
    /// Version 1.
    Current {
        namespace: &'static str,
        name: &'static str,
        description: &'static str,
        state: PointState,
    },
    /// A tag from a newer build. Identity is kept, behavior is not.
    Unsupported {
        version: u32,
        namespace: &'static str,
        name: &'static str,
    },
}

/// A named fault injection point.
///
/// # Example
///
/// ```
/// use faultpoint::{FaultPoint, Mode};
///
/// static READ: FaultPoint = FaultPoint::new("disk", "read", "short read on data file");
///
/// assert!(!READ.is_active());
/// READ.set_error_code(5);
/// READ.activate(Mode::OneShot);
/// assert!(READ.consume());
/// assert!(!READ.is_active());
/// ```
pub struct FaultPoint {
    layout: Layout,
    /// Owning table, linked on first state access.
    module: Option<&'static ModuleTable>,
}

impl fmt::Debug for FaultPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The table points back at this descriptor; print its link state only.
        f.debug_struct("FaultPoint")
            .field("layout", &self.layout)
            .field("linked", &self.module.map(ModuleTable::is_registered))
            .finish()
    }
}

impl FaultPoint {
    /// Create a point using the current layout.
    pub const fn new(
        namespace: &'static str,
        name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            layout: Layout::Current {
                namespace,
                name,
                description,
                state: PointState::new(),
            },
            module: None,
        }
    }

    /// Create a point using the legacy layout.
    pub const fn legacy(
        namespace: &'static str,
        name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            layout: Layout::Legacy {
                namespace,
                name,
                description,
                state: PointState::new(),
            },
            module: None,
        }
    }

    /// Attach the point to the table that declares it.
    ///
    /// The first state access on the point registers `table` with the
    /// process-wide registry, so `FAULT_POINTS` directives reach points used
    /// only by direct reference.
    pub const fn in_module(self, table: &'static ModuleTable) -> Self {
        Self {
            module: Some(table),
            ..self
        }
    }

    /// Create a point from a raw layout tag.
    ///
    /// `0` selects the legacy layout, `1..=CURRENT_LAYOUT` the current one, and anything higher yields an
    /// inert point.
    pub const fn with_layout(
        version: u32,
        namespace: &'static str,
        name: &'static str,
        description: &'static str,
    ) -> Self {
        match version {
            LEGACY_LAYOUT => Self::legacy(namespace, name, description),
            v if v <= CURRENT_LAYOUT => Self::new(namespace, name, description),
            version => Self {
                layout: Layout::Unsupported {
                    version,
                    namespace,
                    name,
                },
                module: None,
            },
        }
    }

    /// Layout tag this point was declared with.
    pub fn layout_version(&self) -> u32 {
        match &self.layout {
            Layout::Legacy { .. } => LEGACY_LAYOUT,
            Layout::Current { .. } => CURRENT_LAYOUT,
            Layout::Unsupported { version, .. } => *version,
        }
    }

    /// Whether this build understands the point's layout.
    pub fn is_supported(&self) -> bool {
        self.state().is_some()
    }

    pub fn namespace(&self) -> &'static str {
        match &self.layout {
            Layout::Legacy { namespace, .. }
            | Layout::Current { namespace, .. }
            | Layout::Unsupported { namespace, .. } => *namespace,
        }
    }

    pub fn name(&self) -> &'static str {
        match &self.layout {
            Layout::Legacy { name, .. }
            | Layout::Current { name, .. }
            | Layout::Unsupported { name, .. } => *name,
        }
    }

    /// Informational text. Empty for unsupported layouts.
    pub fn description(&self) -> &'static str {
        match &self.layout {
            Layout::Legacy { description, .. } | Layout::Current { description, .. } => {
                *description
            }
            Layout::Unsupported { .. } => "",
        }
    }

    /// `true` if this point is named `namespace::name`.
    pub fn matches(&self, namespace: &str, name: &str) -> bool {
        self.namespace() == namespace && self.name() == name
    }

    #[inline]
    fn state(&self) -> Option<&PointState> {
        self.link();
        match &self.layout {
            Layout::Legacy { state, .. } | Layout::Current { state, .. } => Some(state),
            Layout::Unsupported { .. } => None,
        }
    }

    #[inline]
    fn link(&self) {
        if let Some(table) = self.module {
            if !table.is_registered() {
                registry::register_module(table);
            }
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state()
            .is_some_and(|s| s.active.load(Ordering::Acquire))
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.state()
            .map_or(Mode::Multiple, |s| Mode::from_u8(s.mode.load(Ordering::Acquire)))
    }

    pub fn set_mode(&self, mode: Mode) {
        if let Some(s) = self.state() {
            s.mode.store(mode as u8, Ordering::Release);
        }
    }

    #[inline]
    pub fn error_code(&self) -> i32 {
        self.state()
            .map_or(0, |s| s.error_code.load(Ordering::Acquire))
    }

    /// Change the injected error code without touching activation or mode.
    pub fn set_error_code(&self, code: i32) {
        if let Some(s) = self.state() {
            s.error_code.store(code, Ordering::Release);
        }
    }

    /// Activate the point in `mode`.
    ///
    /// The mode is stored before the active flag, so a reader that observes
    /// the point as active also observes this mode.
    pub fn activate(&self, mode: Mode) {
        if let Some(s) = self.state() {
            s.mode.store(mode as u8, Ordering::Release);
            s.active.store(true, Ordering::Release);
        }
    }

    /// Deactivate the point. Mode and error code are left as they are.
    pub fn deactivate(&self) {
        if let Some(s) = self.state() {
            s.active.store(false, Ordering::Release);
        }
    }

    /// Consume one activation.
    ///
    /// Returns `true` if the point was active and the injection should fire.
    /// A one-shot point is deactivated by the same call; when several threads
    /// race on a one-shot point exactly one of them gets `true`. An inactive
    /// point is never touched.
    pub fn consume(&self) -> bool {
        let Some(s) = self.state() else {
            return false;
        };
        if !s.active.load(Ordering::Acquire) {
            return false;
        }
        match Mode::from_u8(s.mode.load(Ordering::Acquire)) {
            Mode::Multiple => true,
            Mode::OneShot => s
                .active
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_ok(),
        }
    }
}
