//! Scoped activation through `InjectionGuard`.

use faultpoint::{InjectionGuard, Mode, inject};

faultpoint::fault_module! {
    static FAULTS = {
        ROUND_TRIP => ("guard", "round_trip"),
        SHARED => ("guard", "shared"),
        NAMED => ("guard", "named"),
    };
}

#[test]
fn round_trip_restores_state() {
    let before = faultpoint::error_code(&ROUND_TRIP);
    {
        let _guard = InjectionGuard::with_mode_and_error(&ROUND_TRIP, Mode::OneShot, -10);
        assert_eq!(faultpoint::error_code(&ROUND_TRIP), -10);
        assert!(faultpoint::is_active(&ROUND_TRIP));
    }
    assert!(!faultpoint::is_active(&ROUND_TRIP));
    assert_eq!(faultpoint::error_code(&ROUND_TRIP), before);
    assert_eq!(faultpoint::mode(&ROUND_TRIP), Mode::Multiple);
}

#[test]
fn keeps_point_enabled_by_someone_else() {
    faultpoint::activate(&SHARED);
    {
        let _guard = InjectionGuard::with_mode(&SHARED, Mode::OneShot);
        assert_eq!(faultpoint::mode(&SHARED), Mode::OneShot);
    }
    assert!(faultpoint::is_active(&SHARED));
    assert_eq!(faultpoint::mode(&SHARED), Mode::Multiple);
    faultpoint::deactivate(&SHARED);
}

#[test]
fn guard_by_name() {
    {
        let guard = InjectionGuard::with_error(("guard", "named"), 21);
        assert!(guard.point().is_some());
        assert_eq!(inject::error_code_or(&NAMED, || 0), 21);
        assert_eq!(inject::error_code_or(&NAMED, || 0), 21);
    }
    assert_eq!(inject::error_code_or(&NAMED, || 0), 0);
    assert_eq!(faultpoint::error_code(&NAMED), 0);
}

#[test]
fn guard_for_unknown_name_is_inert() {
    let guard = InjectionGuard::with_mode_and_error(("guard", "unknown"), Mode::OneShot, 5);
    assert!(guard.point().is_none());
    drop(guard);
    assert!(!faultpoint::is_active(("guard", "unknown")));
}
