//! SoopBlock Block List Files
//!
//! Plain-text export and import of the block lists, plus parsing of the
//! comma-separated input the list editor accepts.
//!
//! The format is line oriented: `!` starts a comment, `[blocked streamers]`
//! and `[blocked tags]` open a section, and every other line is one entry of
//! the current section. Tags are written with a `#` prefix. Import is a set
//! union into the existing lists, never a replacement.

pub mod builder;
pub mod merge;
pub mod parser;

pub use builder::build_snapshot;
pub use merge::{import_snapshot, merge_entries, ImportReport, MergeStats};
pub use parser::{parse_entry_input, parse_snapshot, validate_snapshot, ParseStats, ParsedSnapshot};

/// Errors from strict snapshot validation and list editor input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("line {line}: unknown section {content}")]
    UnknownSection { line: usize, content: String },
    #[error("line {line}: entry outside a known section: {content}")]
    OutsideSection { line: usize, content: String },
    #[error("line {line}: empty entry")]
    EmptyEntry { line: usize },
    #[error("Enter at least one name")]
    EmptyInput,
    #[error("No valid names in input")]
    NoValidEntries,
}
