//! Activation control over a descriptor or a `(namespace, name)` pair.
//!
//! Every function here accepts anything implementing [`Target`]: a direct
//! `&FaultPoint`, an `Option<&FaultPoint>` as returned by
//! [`find`](crate::find), or a `(namespace, name)` tuple resolved through the
//! process-wide registry. A target that resolves to nothing behaves as a
//! permanently inactive point: mutators do nothing and accessors return
//! `false`, [`Mode::Multiple`] and `0`.

use crate::point::{FaultPoint, Mode};
use crate::registry;

/// Something that may designate a fault point.
pub trait Target<'a> {
    /// The designated point, or `None` when there is none.
    fn resolve(self) -> Option<&'a FaultPoint>;
}

impl<'a> Target<'a> for &'a FaultPoint {
    #[inline]
    fn resolve(self) -> Option<&'a FaultPoint> {
        Some(self)
    }
}

impl<'a> Target<'a> for Option<&'a FaultPoint> {
    #[inline]
    fn resolve(self) -> Option<&'a FaultPoint> {
        self
    }
}

impl<'a> Target<'a> for (&str, &str) {
    fn resolve(self) -> Option<&'a FaultPoint> {
        let (namespace, name) = self;
        let found = registry::find(namespace, name);
        if found.is_none() {
            tracing::trace!(namespace, name, "fault point not found");
        }
        found
    }
}

/// Activate in [`Mode::Multiple`].
pub fn activate<'a>(target: impl Target<'a>) {
    activate_mode(target, Mode::Multiple);
}

pub fn activate_mode<'a>(target: impl Target<'a>, mode: Mode) {
    if let Some(point) = target.resolve() {
        point.activate(mode);
    }
}

pub fn deactivate<'a>(target: impl Target<'a>) {
    if let Some(point) = target.resolve() {
        point.deactivate();
    }
}

pub fn is_active<'a>(target: impl Target<'a>) -> bool {
    target.resolve().is_some_and(FaultPoint::is_active)
}

pub fn mode<'a>(target: impl Target<'a>) -> Mode {
    target.resolve().map_or(Mode::Multiple, FaultPoint::mode)
}

pub fn set_mode<'a>(target: impl Target<'a>, mode: Mode) {
    if let Some(point) = target.resolve() {
        point.set_mode(mode);
    }
}

pub fn error_code<'a>(target: impl Target<'a>) -> i32 {
    target.resolve().map_or(0, FaultPoint::error_code)
}

pub fn set_error_code<'a>(target: impl Target<'a>, code: i32) {
    if let Some(point) = target.resolve() {
        point.set_error_code(code);
    }
}

/// Put the error code back to `0`.
pub fn reset_error_code<'a>(target: impl Target<'a>) {
    set_error_code(target, 0);
}

/// Consume one activation; see [`FaultPoint::consume`].
pub fn consume<'a>(target: impl Target<'a>) -> bool {
    target.resolve().is_some_and(FaultPoint::consume)
}

/// Like [`consume`], but only when `condition` holds. A false condition
/// leaves a one-shot point armed.
pub fn consume_if<'a>(target: impl Target<'a>, condition: bool) -> bool {
    condition && consume(target)
}
