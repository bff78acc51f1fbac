// The append-only entry store and the backends it can be written to.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::Level;
use survey_metrics::builder::Submission;

use crate::dash::io_csv::{append_entry, parse_raw, parse_table, RawTable};
use crate::dash::*;

/// Where the store content lives.
///
/// The store always reads and writes the whole content at once.
pub trait StoreBackend {
    /// Returns None if the store does not exist yet.
    fn read(&self) -> std::io::Result<Option<String>>;
    fn write(&mut self, contents: &str) -> std::io::Result<()>;
    /// A name for the store, used in messages.
    fn describe(&self) -> String;
}

/// A store kept in a file on disk.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: &Path) -> FileBackend {
        FileBackend {
            path: path.to_path_buf(),
        }
    }
}

impl StoreBackend for FileBackend {
    fn read(&self) -> std::io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, contents: &str) -> std::io::Result<()> {
        fs::write(&self.path, contents)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A store held in memory.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MemoryBackend {
    pub contents: Option<String>,
}

impl MemoryBackend {
    pub fn with_contents(contents: &str) -> MemoryBackend {
        MemoryBackend {
            contents: Some(contents.to_string()),
        }
    }
}

impl StoreBackend for MemoryBackend {
    fn read(&self) -> std::io::Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> std::io::Result<()> {
        self.contents = Some(contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

/// The outcome of loading the store.
///
/// None of these is an error for the caller: all the failures come with the
/// same empty table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum LoadStatus {
    Loaded { rows: usize },
    /// The store does not exist yet.
    Missing,
    /// The store exists but has no content, not even a header.
    Empty,
    /// The store could not be read or parsed.
    Malformed(String),
}

impl LoadStatus {
    pub fn level(&self) -> Level {
        match self {
            LoadStatus::Loaded { .. } => Level::Info,
            LoadStatus::Missing | LoadStatus::Empty => Level::Warn,
            LoadStatus::Malformed(_) => Level::Error,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadStatus::Loaded { .. } => "loaded",
            LoadStatus::Missing => "missing",
            LoadStatus::Empty => "empty",
            LoadStatus::Malformed(_) => "malformed",
        }
    }

    pub fn message(&self, name: &str) -> String {
        match self {
            LoadStatus::Loaded { rows } => format!("[ok] Loaded CSV: {}  rows = {}", name, rows),
            LoadStatus::Missing => format!(
                "[warning] CSV not found yet: add an entry with 'surveydash submit' to create {}.",
                name
            ),
            LoadStatus::Empty => format!(
                "[warning] CSV {} exists but is empty: submit an entry with 'surveydash submit'.",
                name
            ),
            LoadStatus::Malformed(msg) => format!("[error] Could not read CSV {}: {}", name, msg),
        }
    }

    pub fn report(&self, name: &str) {
        log::log!(self.level(), "load_store: {:?} {:?}", name, self);
    }
}

/// The survey entries, on top of a backend.
pub struct EntryStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> EntryStore<B> {
    pub fn new(backend: B) -> EntryStore<B> {
        EntryStore { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validates a submission and appends the resulting entry.
    ///
    /// Nothing is written when the validation fails.
    pub fn submit(
        &mut self,
        submission: &Submission,
        now: chrono::NaiveDateTime,
    ) -> DashResult<Entry> {
        let entry = submission.build(now).context(InvalidSubmissionSnafu {})?;
        self.append(&entry)?;
        Ok(entry)
    }

    /// Appends one entry: the whole store is read, extended and written back.
    /// A store that does not exist yet is created.
    pub fn append(&mut self, entry: &Entry) -> DashResult<()> {
        let path = self.backend.describe();
        let existing = self
            .backend
            .read()
            .context(ReadingStoreSnafu { path: path.clone() })?;
        debug!(
            "append: {:?}: existing content: {:?} bytes",
            path,
            existing.as_ref().map(|s| s.len())
        );
        let contents = append_entry(existing.as_deref(), entry)?;
        self.backend
            .write(&contents)
            .context(WritingStoreSnafu { path: path.clone() })?;
        info!("append: {:?}: added entry {:?}", path, entry);
        Ok(())
    }

    /// Loads the store, never failing.
    pub fn load(&self) -> (Table, LoadStatus) {
        let contents = match self.backend.read() {
            Ok(Some(s)) => s,
            Ok(None) => return (Table::empty(), LoadStatus::Missing),
            Err(e) => return (Table::empty(), LoadStatus::Malformed(e.to_string())),
        };
        match parse_table(&contents) {
            Ok(Some(table)) => {
                let rows = table.len();
                (table, LoadStatus::Loaded { rows })
            }
            Ok(None) => (Table::empty(), LoadStatus::Empty),
            Err(e) => (Table::empty(), LoadStatus::Malformed(e.to_string())),
        }
    }

    /// The raw content of the store, as text cells. None if the store is
    /// missing or empty.
    pub fn read_raw(&self) -> DashResult<Option<RawTable>> {
        let existing = self.backend.read().context(ReadingStoreSnafu {
            path: self.backend.describe(),
        })?;
        match existing {
            Some(s) if !s.trim().is_empty() => parse_raw(&s).map(Some),
            _ => Ok(None),
        }
    }
}
