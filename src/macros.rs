/// Declare a component's fault points and its module table.
///
/// Each entry becomes a `static` [`FaultPoint`](crate::FaultPoint) in the
/// current layout, attached to the table. The table is linked into the
/// process-wide registry by whichever comes first: a registry query (it is
/// submitted for load-time discovery) or any state access on one of its
/// points.
///
/// ```
/// faultpoint::fault_module! {
///     pub static STORAGE_FAULTS = {
///         pub WAL_APPEND => ("wal", "append", "append to the log fails"),
///         pub WAL_FSYNC => ("wal", "fsync"),
///     };
/// }
///
/// fn main() {
///     assert!(!WAL_FSYNC.is_active());
///     assert!(STORAGE_FAULTS.is_registered());
///     assert!(faultpoint::find("wal", "fsync").is_some());
///     assert_eq!(WAL_APPEND.description(), "append to the log fails");
/// }
/// ```
#[macro_export]
macro_rules! fault_module {
    (
        $table_vis:vis static $table:ident = {
            $( $point_vis:vis $point:ident => ($namespace:literal, $name:literal $(, $description:literal)? ) ),* $(,)?
        };
    ) => {
        $(
            $point_vis static $point: $crate::FaultPoint =
                $crate::FaultPoint::new($namespace, $name, concat!("" $(, $description)?))
                    .in_module(&$table);
        )*

        $table_vis static $table: $crate::ModuleTable =
            $crate::ModuleTable::new(&[ $( Some(&$point) ),* ]);

        $crate::__private::inventory::submit! {
            $crate::__private::ModuleRegistration::new(&$table)
        }
    };
}
