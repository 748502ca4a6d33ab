//! WAL implementation.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use faultpoint::{FaultPoint, inject};

/// Transaction identifier.
pub type TxId = u64;

faultpoint::fault_module! {
    pub static WAL_FAULTS = {
        pub WAL_OPEN => ("wal", "open", "opening the log file fails"),
        pub WAL_APPEND => ("wal", "append", "appending a record fails"),
        pub WAL_FSYNC => ("wal", "fsync", "fsync of the log file fails"),
    };
}

/// `Err` carrying the point's error code as an OS error when it fires.
fn check(point: &FaultPoint) -> io::Result<()> {
    inject::fail_with(point, || io::Error::from_raw_os_error(point.error_code()))
}

/// Minimal append-only write-ahead log.
pub struct Wal {
    /// Path to the WAL directory.
    dir: PathBuf,
    /// Handle to the WAL file.
    file: File,
    /// In-memory state from committed transactions.
    state: HashMap<String, String>,
    /// Next transaction ID to allocate.
    next_txid: TxId,
}

impl Wal {
    /// Open or create a WAL at the given path.
    ///
    /// Creates the directory if it does not exist and recovers state from an
    /// existing log.
    pub fn open(path: &Path) -> io::Result<Self> {
        fs::create_dir_all(path)?;
        check(&WAL_OPEN)?;

        let wal_path = path.join("wal.log");
        let (state, max_txid) = if wal_path.exists() {
            Self::recover_from_file(&wal_path)?
        } else {
            (HashMap::new(), 0)
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&wal_path)?;

        Ok(Self {
            dir: path.to_path_buf(),
            file,
            state,
            next_txid: max_txid + 1,
        })
    }

    /// Replay the log, keeping only committed transactions.
    ///
    /// Returns the recovered state and the highest transaction ID seen.
    fn recover_from_file(wal_path: &Path) -> io::Result<(HashMap<String, String>, TxId)> {
        let reader = BufReader::new(File::open(wal_path)?);

        let mut pending: HashMap<TxId, Vec<(String, String)>> = HashMap::new();
        let mut state = HashMap::new();
        let mut max_txid: TxId = 0;

        for line in reader.lines() {
            let line = line?;
            let parts: Vec<&str> = line.splitn(4, ' ').collect();
            match parts.as_slice() {
                [] | [""] => continue,
                ["BEGIN", txid] => {
                    let txid = parse_txid(txid)?;
                    max_txid = max_txid.max(txid);
                    pending.insert(txid, Vec::new());
                }
                ["PUT", txid, key, value] => {
                    // PUT for a transaction that never began is ignored.
                    if let Some(ops) = pending.get_mut(&parse_txid(txid)?) {
                        ops.push((key.to_string(), value.to_string()));
                    }
                }
                ["COMMIT", txid] => {
                    if let Some(ops) = pending.remove(&parse_txid(txid)?) {
                        state.extend(ops);
                    }
                }
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("malformed WAL record: {line}"),
                    ));
                }
            }
        }

        Ok((state, max_txid))
    }

    fn append(&mut self, record: &str) -> io::Result<()> {
        check(&WAL_APPEND)?;
        writeln!(self.file, "{record}")
    }

    fn sync(&mut self) -> io::Result<()> {
        check(&WAL_FSYNC)?;
        self.file.sync_all()
    }

    /// Begin a new transaction.
    pub fn begin(&mut self) -> io::Result<TxId> {
        let txid = self.next_txid;
        self.append(&format!("BEGIN {txid}"))?;
        self.sync()?;
        self.next_txid += 1;
        Ok(txid)
    }

    /// Write a key-value pair within a transaction.
    pub fn put(&mut self, txid: TxId, key: &str, value: &str) -> io::Result<()> {
        self.append(&format!("PUT {txid} {key} {value}"))
    }

    /// Commit a transaction.
    ///
    /// Records are made durable before the COMMIT marker is written.
    pub fn commit(&mut self, txid: TxId) -> io::Result<()> {
        self.sync()?;
        self.append(&format!("COMMIT {txid}"))?;
        self.sync()?;

        let (state, _) = Self::recover_from_file(&self.dir.join("wal.log"))?;
        self.state = state;
        Ok(())
    }

    /// Get a value by key from committed state.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.state.get(key).map(String::as_str)
    }
}

fn parse_txid(raw: &str) -> io::Result<TxId> {
    raw.parse().map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidData, format!("invalid txid: {raw}"))
    })
}
