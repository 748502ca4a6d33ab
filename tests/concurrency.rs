//! One control thread toggling while workers consume.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use faultpoint::{FaultPoint, Mode, ModuleTable, inject};

faultpoint::fault_module! {
    static FAULTS = {
        TOGGLED => ("stress", "toggled"),
        ONCE => ("stress", "once"),
    };
}

#[test]
fn workers_see_only_configured_codes() {
    TOGGLED.set_error_code(-7);
    let stop = AtomicBool::new(false);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                while !stop.load(Ordering::Acquire) {
                    let code = inject::error_code_or(&TOGGLED, || 1);
                    assert!(code == 1 || code == -7, "unexpected code {code}");
                }
            });
        }

        for _ in 0..1_000 {
            faultpoint::activate(&TOGGLED);
            faultpoint::deactivate(&TOGGLED);
        }
        stop.store(true, Ordering::Release);
    });

    assert!(!TOGGLED.is_active());
}

#[test]
fn one_shot_fires_for_a_single_worker() {
    let fired = AtomicUsize::new(0);

    ONCE.set_error_code(3);
    faultpoint::activate_mode(&ONCE, Mode::OneShot);

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..100 {
                    if inject::error_code_or(&ONCE, || 0) == 3 {
                        fired.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    assert_eq!(fired.load(Ordering::Relaxed), 1);
}

#[test]
fn concurrent_registration_links_once() {
    static LATE_A: FaultPoint = FaultPoint::new("late", "a", "");
    static LATE_B: FaultPoint = FaultPoint::new("late", "b", "");
    static LATE: ModuleTable = ModuleTable::new(&[Some(&LATE_A), Some(&LATE_B)]);

    let linked = AtomicUsize::new(0);
    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                if faultpoint::register_module(&LATE) {
                    linked.fetch_add(1, Ordering::Relaxed);
                }
                // Lookups race with the registration.
                let _ = faultpoint::find("late", "b");
            });
        }
    });

    assert_eq!(linked.load(Ordering::Relaxed), 1);
    let late: Vec<_> = faultpoint::points()
        .iter()
        .filter(|p| p.namespace() == "late")
        .map(|p| p.name())
        .collect();
    assert_eq!(late, ["a", "b"]);
}
