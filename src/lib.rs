//! faultpoint: named fault injection points toggled at runtime.
//!
//! Code under test declares fault points at the call sites where a failure
//! should be injectable. Tests (or a harness, through the `FAULT_POINTS`
//! environment variable) flip those points on and off while the program runs,
//! forcing an error code, an `errno` value or an `Err` in place of the normal
//! result.
//!
//! Each independently compiled component contributes a [`ModuleTable`]. The
//! process-wide [`Registry`] links these tables as components are loaded and
//! serves lookups by `(namespace, name)` and iteration over every point.
//!
//! # Example
//!
//! ```
//! use faultpoint::{InjectionGuard, Mode, inject};
//!
//! faultpoint::fault_module! {
//!     static FAULTS = {
//!         READ => ("disk", "read", "reading a block fails"),
//!     };
//! }
//!
//! fn read_block() -> i32 {
//!     inject::error_code_or(&READ, || 0)
//! }
//!
//! fn main() {
//!     assert_eq!(read_block(), 0);
//!     {
//!         let _guard = InjectionGuard::with_mode_and_error(("disk", "read"), Mode::OneShot, -5);
//!         assert_eq!(read_block(), -5);
//!         assert_eq!(read_block(), 0);
//!     }
//!     assert!(!faultpoint::is_active(&READ));
//! }
//! ```

mod control;
mod guard;
mod macros;
mod module;
mod point;
mod points;
mod registry;

pub mod config;
pub mod inject;

pub use control::{
    Target, activate, activate_mode, consume, consume_if, deactivate, error_code, is_active,
    mode, reset_error_code, set_error_code, set_mode,
};
pub use guard::InjectionGuard;
pub use module::ModuleTable;
pub use point::{CURRENT_LAYOUT, FaultPoint, LEGACY_LAYOUT, Mode};
pub use points::{Iter, IterMut, PointView, Points};
pub use registry::{Modules, Registry, find, points, register_module, registry};

#[doc(hidden)]
pub mod __private {
    pub use crate::registry::ModuleRegistration;
    pub use inventory;
}
