//! Injection through the call-site helpers: error codes, errno and `Err`.
//!
//! All tests here share `test::simple`, so they run serially.

use faultpoint::{Mode, inject};
use serial_test::serial;

faultpoint::fault_module! {
    static TEST_FAULTS = {
        SIMPLE => ("test", "simple"),
        SECOND => ("test", "second"),
    };
}

faultpoint::fault_module! {
    static TEST2_FAULTS = {
        ANOTHER => ("test2", "another"),
    };
}

fn is_injected(err: &str) -> bool {
    err == "INJECTED"
}

#[test]
#[serial]
fn error_code_not_injected() {
    let value = inject::error_code_or(&SIMPLE, || 15);
    assert_eq!(value, 15);
}

#[test]
#[serial]
fn error_code_default() {
    faultpoint::activate(&SIMPLE);
    let value = inject::error_code_or(&SIMPLE, || 15);
    faultpoint::deactivate(&SIMPLE);

    assert_eq!(value, 0);
}

#[test]
#[serial]
fn error_code_custom() {
    faultpoint::activate(&SIMPLE);
    faultpoint::set_error_code(&SIMPLE, -10);

    let value = inject::error_code_or(&SIMPLE, || 15);

    faultpoint::reset_error_code(&SIMPLE);
    faultpoint::deactivate(&SIMPLE);

    assert_eq!(value, -10);
}

#[test]
#[serial]
fn error_code_custom_by_name() {
    faultpoint::activate(("test", "simple"));
    faultpoint::set_error_code(("test", "simple"), -10);

    let value = inject::error_code_or(&SIMPLE, || 15);

    faultpoint::reset_error_code(("test", "simple"));
    faultpoint::deactivate(("test", "simple"));

    assert_eq!(value, -10);
    assert!(!SIMPLE.is_active());
}

#[test]
#[serial]
fn other_points_are_unaffected() {
    faultpoint::activate(&SIMPLE);

    assert_eq!(inject::error_code_or(&SECOND, || 1), 1);
    assert_eq!(inject::error_code_or(&ANOTHER, || 2), 2);

    faultpoint::deactivate(&SIMPLE);
}

#[cfg(unix)]
mod errno {
    use super::*;

    fn errno() -> i32 {
        std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
    }

    #[test]
    #[serial]
    fn not_injected_runs_action() {
        let mut called = false;
        let value = inject::errno_or_minus_one(&SIMPLE, || {
            called = true;
            0
        });

        assert_eq!(value, 0);
        assert!(called);
    }

    #[test]
    #[serial]
    fn default_error_code() {
        faultpoint::activate(&SIMPLE);

        let mut called = false;
        let value = inject::errno_or_minus_one(&SIMPLE, || {
            called = true;
            0
        });
        let observed = errno();

        faultpoint::deactivate(&SIMPLE);

        assert_eq!(value, -1);
        assert_eq!(observed, 0);
        assert!(!called);
    }

    #[test]
    #[serial]
    fn custom_error_code() {
        faultpoint::activate(&SIMPLE);
        faultpoint::set_error_code(&SIMPLE, libc::EAGAIN);

        let mut called = false;
        let value = inject::errno_or_minus_one(&SIMPLE, || {
            called = true;
            0
        });
        let observed = errno();

        faultpoint::reset_error_code(&SIMPLE);
        faultpoint::deactivate(&SIMPLE);

        assert_eq!(value, -1);
        assert_eq!(observed, libc::EAGAIN);
        assert!(!called);
    }

    #[test]
    #[serial]
    fn custom_sentinel() {
        faultpoint::activate(&SIMPLE);
        faultpoint::set_error_code(&SIMPLE, libc::EAGAIN);

        let value = inject::errno_or(&SIMPLE, || 0, -10);
        let observed = errno();

        faultpoint::reset_error_code(&SIMPLE);
        faultpoint::deactivate(&SIMPLE);

        assert_eq!(value, -10);
        assert_eq!(observed, libc::EAGAIN);
    }
}

#[test]
#[serial]
fn err_not_injected() {
    assert_eq!(inject::fail_with(&SIMPLE, || "INJECTED"), Ok(()));
}

#[test]
#[serial]
fn err_injected() {
    faultpoint::activate(&SIMPLE);
    let result = inject::fail_with(&SIMPLE, || "INJECTED");
    faultpoint::deactivate(&SIMPLE);

    assert!(result.is_err_and(is_injected));
}

#[test]
#[serial]
fn err_with_condition() {
    faultpoint::activate_mode(&SIMPLE, Mode::OneShot);

    let skipped = faultpoint::consume_if(&SIMPLE, false);
    let fired = faultpoint::consume_if(&SIMPLE, true);

    assert!(!skipped);
    assert!(fired);
    assert!(!SIMPLE.is_active());
}
