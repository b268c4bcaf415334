//! Flat-text wallet export.
//!
//! ```text
//! wallet(<label>):
//!    private: <encrypted key, or plain:<WIF>>
//!    address: <address>
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::record::{ProtectedKey, WalletRecord};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),
    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Write records in export format
pub fn write_records<W: Write>(mut out: W, records: &[WalletRecord]) -> io::Result<()> {
    for record in records {
        writeln!(out, "wallet({}):", record.label)?;
        writeln!(out, "   private: {}", record.private_key)?;
        writeln!(out, "   address: {}", record.address)?;
    }
    out.flush()
}

/// Create `path` and write records to it; an existing file is only
/// replaced when `overwrite` is set.
pub fn export_to_path(path: &Path, records: &[WalletRecord], overwrite: bool) -> Result<(), ExportError> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let file = options.open(path).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => ExportError::AlreadyExists(path.to_path_buf()),
        _ => ExportError::Io(e),
    })?;
    write_records(BufWriter::new(file), records)?;
    Ok(())
}

enum Expect {
    Header,
    Private { label: String },
    Address { label: String, private_key: ProtectedKey },
}

/// Parse records written by [`write_records`]
pub fn read_records<R: BufRead>(input: R) -> Result<Vec<WalletRecord>, ExportError> {
    let mut records = Vec::new();
    let mut state = Expect::Header;

    for (n, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = n + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let malformed = |reason: String| ExportError::Malformed { line: line_no, reason };

        state = match state {
            Expect::Header => {
                let label = trimmed
                    .strip_prefix("wallet(")
                    .and_then(|rest| rest.strip_suffix("):"))
                    .ok_or_else(|| malformed("expected `wallet(<label>):`".into()))?;
                Expect::Private { label: label.to_string() }
            }
            Expect::Private { label } => {
                let value = field(trimmed, "private:").ok_or_else(|| malformed("expected `private:`".into()))?;
                let private_key = value.parse().map_err(|e| malformed(format!("{}", e)))?;
                Expect::Address { label, private_key }
            }
            Expect::Address { label, private_key } => {
                let address = field(trimmed, "address:").ok_or_else(|| malformed("expected `address:`".into()))?;
                let index = WalletRecord::index_from_label(&label)
                    .ok_or_else(|| malformed(format!("label `{}` has no wallet index", label)))?;
                records.push(WalletRecord {
                    index,
                    label,
                    private_key,
                    address: address.to_string(),
                });
                Expect::Header
            }
        };
    }

    match state {
        Expect::Header => Ok(records),
        _ => Err(ExportError::Malformed {
            line: 0,
            reason: "file ends inside a wallet record".into(),
        }),
    }
}

/// Read an export file from disk
pub fn read_path(path: &Path) -> Result<Vec<WalletRecord>, ExportError> {
    read_records(BufReader::new(File::open(path)?))
}

fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.strip_prefix(name).map(str::trim)
}
