//! Snapshot log and candle file

use market_data::{build_candles, Candle, CandleInterval, Snapshot};
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::Result;

/// Owns the snapshot log and the candle file under one data directory.
///
/// Appends and candle rebuilds from this process are serialized by an
/// internal writer lock. Other processes writing the same files are not
/// coordinated with.
#[derive(Debug)]
pub struct SnapshotStore {
    data_dir: PathBuf,
    snapshot_path: PathBuf,
    candle_path: PathBuf,
    writer: Mutex<()>,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>, snapshot_file: &str, candle_file: &str) -> Self {
        let data_dir = data_dir.into();
        Self {
            snapshot_path: data_dir.join(snapshot_file),
            candle_path: data_dir.join(candle_file),
            data_dir,
            writer: Mutex::new(()),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn candle_path(&self) -> &Path {
        &self.candle_path
    }

    /// Append one snapshot to the log
    pub fn append_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let _guard = self.writer.lock();
        self.append_locked(snapshot)
    }

    /// Append a snapshot and rebuild the one-minute candle file in one step
    pub fn record(&self, snapshot: &Snapshot) -> Result<Vec<Candle>> {
        let _guard = self.writer.lock();
        self.append_locked(snapshot)?;
        self.rebuild_locked()
    }

    /// Recompute every one-minute candle from the full log and overwrite the candle file
    pub fn rebuild_candles(&self) -> Result<Vec<Candle>> {
        let _guard = self.writer.lock();
        self.rebuild_locked()
    }

    /// Every readable snapshot in log order. A missing log is empty.
    ///
    /// Lines that fail to decode are skipped with a warning.
    pub fn read_snapshots(&self) -> Result<Vec<Snapshot>> {
        let raw = match fs::read_to_string(&self.snapshot_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.snapshot_path, e)),
        };

        let mut snapshots = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Snapshot>(line) {
                Ok(snap) => snapshots.push(snap),
                Err(e) => warn!(line = idx + 1, error = %e, "Skipping unreadable snapshot"),
            }
        }
        Ok(snapshots)
    }

    /// The persisted one-minute candles; `[]` before the first rebuild
    pub fn read_candles(&self) -> Result<Vec<Candle>> {
        let raw = match fs::read_to_string(&self.candle_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.candle_path, e)),
        };
        serde_json::from_str(&raw).map_err(|e| StorageError::serde(&self.candle_path, e))
    }

    /// Candles for any interval. One-minute candles come from the file;
    /// wider intervals are folded from the log on demand.
    pub fn candles(&self, interval: CandleInterval) -> Result<Vec<Candle>> {
        match interval {
            CandleInterval::OneMinute => self.read_candles(),
            other => Ok(build_candles(&self.read_snapshots()?, other)),
        }
    }

    fn append_locked(&self, snapshot: &Snapshot) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| StorageError::io(&self.data_dir, e))?;

        let mut line =
            serde_json::to_string(snapshot).map_err(|e| StorageError::serde(&self.snapshot_path, e))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.snapshot_path)
            .map_err(|e| StorageError::io(&self.snapshot_path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| StorageError::io(&self.snapshot_path, e))?;

        debug!(ts = %snapshot.ts, price = ?snapshot.underlying_price, "Snapshot appended");
        Ok(())
    }

    fn rebuild_locked(&self) -> Result<Vec<Candle>> {
        let candles = build_candles(&self.read_snapshots()?, CandleInterval::OneMinute);

        fs::create_dir_all(&self.data_dir).map_err(|e| StorageError::io(&self.data_dir, e))?;
        let encoded =
            serde_json::to_vec(&candles).map_err(|e| StorageError::serde(&self.candle_path, e))?;
        fs::write(&self.candle_path, encoded).map_err(|e| StorageError::io(&self.candle_path, e))?;

        debug!(count = candles.len(), "Candles rebuilt");
        Ok(candles)
    }
}
