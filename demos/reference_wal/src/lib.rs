//! Reference write-ahead log instrumented with fault points.
//!
//! Shows how a component declares its own fault module and turns an armed
//! point into an `io::Error` at the call site.

mod wal;

pub use wal::{TxId, WAL_APPEND, WAL_FAULTS, WAL_FSYNC, WAL_OPEN, Wal};
