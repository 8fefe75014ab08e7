use sb_core::config::ListKind;
use sb_core::BlockList;

use crate::SnapshotError;

/// Comment marker for snapshot lines.
pub const COMMENT_PREFIX: char = '!';
/// Prefix written before each tag.
pub const TAG_PREFIX: char = '#';
/// Marks a line as a literal entry, for names that would otherwise read as
/// a comment or a section header. Stripped once on import.
pub const ESCAPE_PREFIX: char = '\\';

/// Header for the streamer section.
pub const STREAMER_SECTION: &str = "blocked streamers";
/// Header for the tag section.
pub const TAG_SECTION: &str = "blocked tags";

/// Lists read from a snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSnapshot {
    pub streamers: BlockList,
    pub tags: BlockList,
    pub stats: ParseStats,
}

impl ParsedSnapshot {
    pub fn list(&self, kind: ListKind) -> &BlockList {
        match kind {
            ListKind::Streamers => &self.streamers,
            ListKind::Tags => &self.tags,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Entries accepted into a list
    pub entries: usize,
    /// Entries repeated within the file
    pub repeated: usize,
    /// Lines that belonged to no known section, or were empty tags
    pub skipped_lines: usize,
}

/// Why a line was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    UnknownSection,
    OutsideSection,
    EmptyEntry,
}

enum Line<'a> {
    Blank,
    Comment,
    Section(Option<ListKind>),
    Entry(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    if let Some(entry) = line.strip_prefix(ESCAPE_PREFIX) {
        return Line::Entry(entry);
    }
    if line.starts_with(COMMENT_PREFIX) {
        return Line::Comment;
    }
    if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return Line::Section(section_kind(name));
    }
    Line::Entry(line)
}

fn section_kind(name: &str) -> Option<ListKind> {
    let name = name.trim();
    if name.eq_ignore_ascii_case(STREAMER_SECTION) {
        Some(ListKind::Streamers)
    } else if name.eq_ignore_ascii_case(TAG_SECTION) {
        Some(ListKind::Tags)
    } else {
        None
    }
}

/// Normalize one entry for `kind`. Tags lose a single leading `#`.
fn entry_value(kind: ListKind, entry: &str) -> Option<&str> {
    let value = match kind {
        ListKind::Streamers => entry,
        ListKind::Tags => entry.strip_prefix(TAG_PREFIX).unwrap_or(entry).trim(),
    };
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn scan<F>(text: &str, mut on_skip: F) -> Result<ParsedSnapshot, SnapshotError>
where
    F: FnMut(Skip, usize, &str) -> Result<(), SnapshotError>,
{
    let mut snapshot = ParsedSnapshot::default();
    let mut section: Option<ListKind> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        match classify(raw) {
            Line::Blank | Line::Comment => {}
            Line::Section(Some(kind)) => section = Some(kind),
            Line::Section(None) => {
                section = None;
                snapshot.stats.skipped_lines += 1;
                on_skip(Skip::UnknownSection, line_no, raw.trim())?;
            }
            Line::Entry(entry) => {
                let Some(kind) = section else {
                    snapshot.stats.skipped_lines += 1;
                    on_skip(Skip::OutsideSection, line_no, entry)?;
                    continue;
                };
                match entry_value(kind, entry) {
                    Some(value) => {
                        let list = match kind {
                            ListKind::Streamers => &mut snapshot.streamers,
                            ListKind::Tags => &mut snapshot.tags,
                        };
                        if list.insert(value) {
                            snapshot.stats.entries += 1;
                        } else {
                            snapshot.stats.repeated += 1;
                        }
                    }
                    None => {
                        snapshot.stats.skipped_lines += 1;
                        on_skip(Skip::EmptyEntry, line_no, entry)?;
                    }
                }
            }
        }
    }

    Ok(snapshot)
}

/// Parse a snapshot file, dropping anything that is not an entry of a known
/// section. Never fails; dropped lines are counted in the stats.
pub fn parse_snapshot(text: &str) -> ParsedSnapshot {
    let parsed = scan(text, |reason, line_no, line| {
        log::debug!("skipping snapshot line {} ({:?}): {:?}", line_no, reason, line);
        Ok(())
    });
    parsed.unwrap_or_default()
}

/// Parse a snapshot file, failing on the first line the lenient parser
/// would drop.
pub fn validate_snapshot(text: &str) -> Result<ParsedSnapshot, SnapshotError> {
    scan(text, |reason, line_no, line| {
        let content = line.to_string();
        Err(match reason {
            Skip::UnknownSection => SnapshotError::UnknownSection { line: line_no, content },
            Skip::OutsideSection => SnapshotError::OutsideSection { line: line_no, content },
            Skip::EmptyEntry => SnapshotError::EmptyEntry { line: line_no },
        })
    })
}

/// Split comma-separated list editor input into entries.
///
/// Entries are trimmed and empty ones dropped; order and repeats are kept so
/// the caller can report repeats as duplicates.
pub fn parse_entry_input(input: &str) -> Result<Vec<String>, SnapshotError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SnapshotError::EmptyInput);
    }

    let entries: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();

    if entries.is_empty() {
        return Err(SnapshotError::NoValidEntries);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let text = "! SoopBlock block list\n\
                    [blocked streamers]\n\
                    A\n  B  \n\n\
                    [blocked tags]\n\
                    #x\n\
                    y\n\
                    ! total: 2 streamers, 2 tags\n";
        let parsed = parse_snapshot(text);
        assert_eq!(parsed.streamers.as_slice(), &["A".to_string(), "B".to_string()]);
        assert_eq!(parsed.tags.as_slice(), &["x".to_string(), "y".to_string()]);
        assert_eq!(parsed.stats.entries, 4);
        assert_eq!(parsed.stats.skipped_lines, 0);
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let parsed = parse_snapshot("[Blocked Streamers]\nA\n[BLOCKED TAGS]\n#t\n");
        assert!(parsed.streamers.contains("A"));
        assert!(parsed.tags.contains("t"));
    }

    #[test]
    fn test_lines_outside_sections_are_counted() {
        let text = "stray\n[favourites]\nC\n[blocked streamers]\nA\n";
        let parsed = parse_snapshot(text);
        assert_eq!(parsed.streamers.as_slice(), &["A".to_string()]);
        // the stray line, the unknown header and its entry
        assert_eq!(parsed.stats.skipped_lines, 3);
    }

    #[test]
    fn test_only_one_hash_is_stripped() {
        let parsed = parse_snapshot("[blocked tags]\n##x\n#\n");
        assert_eq!(parsed.tags.as_slice(), &["#x".to_string()]);
        assert_eq!(parsed.stats.skipped_lines, 1);
    }

    #[test]
    fn test_repeated_entries_are_collapsed() {
        let parsed = parse_snapshot("[blocked streamers]\nA\nA\nB\n");
        assert_eq!(parsed.streamers.len(), 2);
        assert_eq!(parsed.stats.repeated, 1);
    }

    #[test]
    fn test_escaped_lines_are_entries() {
        let parsed = parse_snapshot("[blocked streamers]\n\\!Bang\n\\[blocked tags]\n\\\\x\nA\n");
        assert_eq!(
            parsed.streamers.as_slice(),
            &["!Bang".to_string(), "[blocked tags]".to_string(), "\\x".to_string(), "A".to_string()]
        );
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn test_validate_reports_first_bad_line() {
        assert_eq!(
            validate_snapshot("! header\nA\n"),
            Err(SnapshotError::OutsideSection { line: 2, content: "A".to_string() })
        );
        assert_eq!(
            validate_snapshot("[blocked streamers]\nA\n[other]\n"),
            Err(SnapshotError::UnknownSection { line: 3, content: "[other]".to_string() })
        );
        assert_eq!(
            validate_snapshot("[blocked tags]\n#x\n #\n"),
            Err(SnapshotError::EmptyEntry { line: 3 })
        );
        assert!(validate_snapshot("[blocked tags]\n#x\n").is_ok());
    }

    #[test]
    fn test_entry_input() {
        assert_eq!(
            parse_entry_input(" A, B ,,A ").unwrap(),
            vec!["A".to_string(), "B".to_string(), "A".to_string()]
        );
        assert_eq!(parse_entry_input("   "), Err(SnapshotError::EmptyInput));
        assert_eq!(parse_entry_input(", ,"), Err(SnapshotError::NoValidEntries));
    }
}
