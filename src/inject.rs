//! Helpers for instrumented call sites.
//!
//! Each helper consumes one activation of its point (see
//! [`FaultPoint::consume`](crate::FaultPoint::consume)). When the point fires
//! the normal action is skipped entirely and the configured failure is
//! produced instead; otherwise the action runs and its result is returned
//! unchanged.
//!
//! ```
//! use faultpoint::{FaultPoint, Mode, inject};
//!
//! static OPEN: FaultPoint = FaultPoint::new("disk", "open", "");
//!
//! fn open() -> i32 {
//!     inject::error_code_or(&OPEN, || 0)
//! }
//!
//! assert_eq!(open(), 0);
//! OPEN.set_error_code(-2);
//! OPEN.activate(Mode::OneShot);
//! assert_eq!(open(), -2);
//! assert_eq!(open(), 0);
//! ```

use crate::control::{Target, consume};

/// Return the point's error code when it fires, `action()` otherwise.
pub fn error_code_or<'a, F>(target: impl Target<'a>, action: F) -> i32
where
    F: FnOnce() -> i32,
{
    match target.resolve() {
        Some(point) if point.consume() => point.error_code(),
        _ => action(),
    }
}

/// When the point fires, set the calling thread's `errno` to the point's
/// error code and return `sentinel`; run `action()` otherwise.
pub fn errno_or<'a, T, F>(target: impl Target<'a>, action: F, sentinel: T) -> T
where
    F: FnOnce() -> T,
{
    match target.resolve() {
        Some(point) if point.consume() => {
            set_errno(point.error_code());
            sentinel
        }
        _ => action(),
    }
}

/// [`errno_or`] with the conventional `-1` sentinel.
pub fn errno_or_minus_one<'a, F>(target: impl Target<'a>, action: F) -> i32
where
    F: FnOnce() -> i32,
{
    errno_or(target, action, -1)
}

/// `Err(err())` when the point fires, `Ok(())` otherwise.
pub fn fail_with<'a, E, F>(target: impl Target<'a>, err: F) -> Result<(), E>
where
    F: FnOnce() -> E,
{
    if consume(target) { Err(err()) } else { Ok(()) }
}

/// `Err(err())` when the point fires, `action()` otherwise.
pub fn result_or<'a, T, E, F, G>(target: impl Target<'a>, err: G, action: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    G: FnOnce() -> E,
{
    fail_with(target, err)?;
    action()
}

/// Store `code` in the calling thread's `errno`.
fn set_errno(code: i32) {
    // SAFETY: each libc accessor returns a valid pointer to the calling
    // thread's errno slot.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    unsafe {
        *libc::__errno_location() = code;
    }
    #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
    unsafe {
        *libc::__error() = code;
    }
    #[cfg(any(target_os = "netbsd", target_os = "openbsd"))]
    unsafe {
        *libc::__errno() = code;
    }
    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd"
    )))]
    tracing::debug!(code, "errno injection unsupported on this target");
}
