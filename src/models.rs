//! Core data models used throughout doc-quarry.
//!
//! These types represent the docstring records that flow from the extractor
//! into SQLite, plus the per-repository counters the harvest loop reports.

/// Kind of syntax node a docstring was attached to.
///
/// Closed enumeration — anything else in the parse tree produces no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    Module,
    Class,
    Function,
}

impl DocKind {
    /// Value persisted in the `doc_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Module => "module",
            DocKind::Class => "class",
            DocKind::Function => "function",
        }
    }
}

/// A docstring extracted from one syntax node, before persistence.
#[derive(Debug, Clone)]
pub struct DocRecord {
    /// Trimmed documentation text. Never empty — whitespace-only
    /// docstrings are discarded by the extractor.
    pub content: String,
    pub source_url: Option<String>,
    pub project_name: Option<String>,
    /// Path relative to the clone directory (collection root).
    pub file_path: Option<String>,
    pub doc_type: DocKind,
    /// Declared name of the documented entity; module records fall back
    /// to the project name, then the file's base name.
    pub object_name: Option<String>,
}

/// A row read back from the `docstrings` table.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: i64,
    pub content: String,
    pub source_url: Option<String>,
    pub project_name: Option<String>,
    pub file_path: Option<String>,
    pub doc_type: Option<String>,
    pub object_name: Option<String>,
    /// Reserved for a future classification stage. Always NULL here.
    pub style: Option<String>,
}

/// Counters accumulated while harvesting one repository.
///
/// Returned by value from each stage and absorbed by the caller — there is
/// no shared mutable counter state anywhere in the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub files_scanned: u64,
    pub extraction_errors: u64,
    pub records_stored: u64,
}

impl RunCounters {
    /// Fold another repository's counters into a running total.
    pub fn absorb(&mut self, other: RunCounters) {
        self.files_scanned += other.files_scanned;
        self.extraction_errors += other.extraction_errors;
        self.records_stored += other.records_stored;
    }
}
