//! Flat-file backend: one encoded record per line.
//!
//! `put` appends a line without looking at existing ones. A trigger may
//! therefore appear on several lines; reads resolve this by letting the last
//! line win, and `delete` drops every line for the trigger. `delete` and
//! `compact` rewrite through a temporary file that atomically replaces the
//! original.
//!
//! Lines are handled as raw bytes: a line that is not valid UTF-8 is skipped
//! on read and written back unchanged by `delete`.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::backend::TriggerBackend;
use crate::codec;
use crate::error::{ParrotError, ParrotResult};
use crate::types::TriggerRecord;

/// Text-file trigger store.
pub struct FlatFileTriggerBackend {
    path: PathBuf,
    /// Serializes file access within the process.
    guard: Mutex<()>,
}

impl FlatFileTriggerBackend {
    /// Open or create a store file at the given path.
    pub fn new(path: impl AsRef<Path>) -> ParrotResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            guard: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the file with exactly one line per trigger.
    ///
    /// Returns the number of lines dropped (blank, undecodable, or superseded).
    pub fn compact(&self) -> ParrotResult<usize> {
        let _guard = self.lock()?;
        let lines = self.read_lines()?;
        let records = Self::resolve(&lines);

        let dropped = lines.len() - records.len();
        if dropped > 0 {
            self.rewrite(records.iter().map(codec::encode_bytes))?;
            debug!(path = %self.path.display(), dropped, "Compacted trigger file");
        }
        Ok(dropped)
    }

    fn lock(&self) -> ParrotResult<MutexGuard<'_, ()>> {
        self.guard
            .lock()
            .map_err(|_| ParrotError::poisoned("flat file"))
    }

    /// Raw lines of the file, without `\n` or a trailing `\r`.
    fn read_lines(&self) -> ParrotResult<Vec<Vec<u8>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut lines = Vec::new();
        for line in BufReader::new(file).split(b'\n') {
            let mut line = line?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(line);
        }
        Ok(lines)
    }

    fn is_blank(line: &[u8]) -> bool {
        line.iter().all(u8::is_ascii_whitespace)
    }

    /// Decode lines into records, last line winning per trigger.
    fn resolve(lines: &[Vec<u8>]) -> Vec<TriggerRecord> {
        let mut records: Vec<TriggerRecord> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (idx, line) in lines.iter().enumerate() {
            if Self::is_blank(line) {
                continue;
            }

            let record = match codec::decode_bytes(line) {
                Ok(record) => record,
                Err(e) => {
                    warn!(line = idx + 1, error = %e, "Skipping undecodable trigger line");
                    continue;
                }
            };

            match positions.get(&record.trigger) {
                Some(&pos) => records[pos] = record,
                None => {
                    positions.insert(record.trigger.clone(), records.len());
                    records.push(record);
                }
            }
        }

        records
    }

    fn rewrite<I>(&self, lines: I) -> ParrotResult<()>
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            for line in lines {
                writer.write_all(&line)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl TriggerBackend for FlatFileTriggerBackend {
    fn put(&self, record: &TriggerRecord) -> ParrotResult<()> {
        let _guard = self.lock()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut line = codec::encode(record);
        line.push('\n');
        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        Ok(())
    }

    fn delete(&self, trigger: &str) -> ParrotResult<()> {
        let _guard = self.lock()?;
        let lines = self.read_lines()?;

        let target = Some(trigger.as_bytes());
        if !lines
            .iter()
            .any(|line| codec::trigger_of_bytes(line) == target)
        {
            return Ok(());
        }

        let kept = lines
            .into_iter()
            .filter(|line| !Self::is_blank(line))
            .filter(|line| codec::trigger_of_bytes(line) != target);

        self.rewrite(kept)
    }

    fn get(&self, trigger: &str) -> ParrotResult<Option<TriggerRecord>> {
        Ok(self
            .scan_all()?
            .into_iter()
            .find(|record| record.trigger == trigger))
    }

    fn scan_all(&self) -> ParrotResult<Vec<TriggerRecord>> {
        let _guard = self.lock()?;
        let lines = self.read_lines()?;
        Ok(Self::resolve(&lines))
    }

    fn name(&self) -> &'static str {
        "flat_file"
    }
}
