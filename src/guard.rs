//! Scoped activation for tests.

use crate::control::Target;
use crate::point::{FaultPoint, Mode};

/// Activates a fault point for the lifetime of the guard and undoes that
/// activation when dropped.
///
/// On construction the guard records what it needs to restore: whether the
/// point was already active, and the previous mode and error code when it
/// overrides them. On drop it restores the error code, then the mode, and
/// finally deactivates the point only if it was inactive to begin with, so a
/// point turned on elsewhere stays on.
///
/// Guards do not stack. Two live guards on the same point each restore their
/// own snapshot, and whichever drops last wins.
///
/// A guard built from a name that is not registered is inert.
///
/// # Example
///
/// ```
/// use faultpoint::{FaultPoint, InjectionGuard, Mode};
///
/// static WRITE: FaultPoint = FaultPoint::new("disk", "write", "");
///
/// {
///     let _guard = InjectionGuard::with_mode_and_error(&WRITE, Mode::OneShot, -10);
///     assert!(WRITE.is_active());
///     assert_eq!(WRITE.error_code(), -10);
/// }
/// assert!(!WRITE.is_active());
/// assert_eq!(WRITE.error_code(), 0);
/// ```
#[derive(Debug)]
#[must_use = "the point is restored as soon as the guard is dropped"]
pub struct InjectionGuard<'a> {
    point: Option<&'a FaultPoint>,
    was_inactive: bool,
    old_mode: Option<Mode>,
    old_error: Option<i32>,
}

impl<'a> InjectionGuard<'a> {
    /// Activate keeping the point's current mode and error code.
    pub fn new(target: impl Target<'a>) -> Self {
        Self::apply(target.resolve(), None, None)
    }

    pub fn with_mode(target: impl Target<'a>, mode: Mode) -> Self {
        Self::apply(target.resolve(), Some(mode), None)
    }

    pub fn with_error(target: impl Target<'a>, error: i32) -> Self {
        Self::apply(target.resolve(), None, Some(error))
    }

    pub fn with_mode_and_error(target: impl Target<'a>, mode: Mode, error: i32) -> Self {
        Self::apply(target.resolve(), Some(mode), Some(error))
    }

    fn apply(point: Option<&'a FaultPoint>, mode: Option<Mode>, error: Option<i32>) -> Self {
        let Some(p) = point else {
            return Self {
                point: None,
                was_inactive: false,
                old_mode: None,
                old_error: None,
            };
        };

        let guard = Self {
            point,
            was_inactive: !p.is_active(),
            old_mode: mode.map(|_| p.mode()),
            old_error: error.map(|_| p.error_code()),
        };

        if let Some(error) = error {
            p.set_error_code(error);
        }
        p.activate(mode.unwrap_or_else(|| p.mode()));
        guard
    }

    /// The guarded point, `None` for an inert guard.
    pub fn point(&self) -> Option<&'a FaultPoint> {
        self.point
    }
}

impl Drop for InjectionGuard<'_> {
    fn drop(&mut self) {
        let Some(point) = self.point else {
            return;
        };
        if let Some(error) = self.old_error {
            point.set_error_code(error);
        }
        if let Some(mode) = self.old_mode {
            point.set_mode(mode);
        }
        if self.was_inactive {
            point.deactivate();
        }
    }
}
