use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use core_sim::Snapshot;

pub const SNAPSHOT_CSV_HEADER: &str = "date,price,total,cash,equity,dip\n";

static NEXT_STAGING_ID: AtomicU64 = AtomicU64::new(0);

pub struct SnapshotCsvWriter<W: Write> {
    writer: W,
}

impl<W: Write> SnapshotCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(SNAPSHOT_CSV_HEADER.as_bytes())
    }

    pub fn append_snapshots(&mut self, snapshots: &[Snapshot]) -> io::Result<()> {
        for snapshot in snapshots {
            let date = escape_csv_field(&snapshot.date.to_string());
            writeln!(
                self.writer,
                "{date},{},{},{},{},{}",
                snapshot.price, snapshot.total, snapshot.cash, snapshot.equity, snapshot.dip
            )?;
        }
        Ok(())
    }

    /// Writes the header and every row, then flushes.
    pub fn write_table(&mut self, snapshots: &[Snapshot]) -> io::Result<()> {
        self.write_header()?;
        self.append_snapshots(snapshots)?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Replaces the file at `path` with the snapshot table of this run, creating
/// missing parent directories.
///
/// The table is written to a staging file next to `path` and renamed over it,
/// so readers and concurrent writers only ever see a complete table. The
/// staging file is removed when any step fails.
pub fn write_snapshot_file(path: &Path, snapshots: &[Snapshot]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path)?;
    let result = write_staged(&staging, snapshots).and_then(|()| fs::rename(&staging, path));
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn write_staged(staging: &Path, snapshots: &[Snapshot]) -> io::Result<()> {
    let mut writer = SnapshotCsvWriter::new(BufWriter::new(File::create(staging)?));
    writer.write_table(snapshots)?;
    let file = writer
        .into_inner()
        .into_inner()
        .map_err(|err| err.into_error())?;
    file.sync_all()
}

fn staging_path(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("snapshot output `{}` has no file name", path.display()),
        )
    })?;
    let id = NEXT_STAGING_ID.fetch_add(1, Ordering::Relaxed);
    let mut staged = std::ffi::OsString::from(".");
    staged.push(file_name);
    staged.push(format!(".{}.{id}.tmp", std::process::id()));
    Ok(path.with_file_name(staged))
}

fn escape_csv_field(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|ch| matches!(ch, ',' | '"' | '\n' | '\r'));
    if !needs_quotes {
        return value.to_string();
    }

    let escaped = value.replace('"', "\"\"");
    format!("\"{escaped}\"")
}
