use serde::Serialize;

use sb_core::config::ListKind;
use sb_core::{BlockConfig, BlockList};

use crate::parser::ParsedSnapshot;

/// Outcome of merging entries into one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Entries newly appended, in input order
    pub added: Vec<String>,
    /// Entries that were already present
    pub duplicates: Vec<String>,
}

impl MergeStats {
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }

    /// User-facing summary, or `None` if there is nothing to say.
    pub fn summary(&self, kind: ListKind) -> Option<String> {
        let mut lines = Vec::new();
        if !self.added.is_empty() {
            let plural = if self.added.len() == 1 { "" } else { "s" };
            lines.push(format!("{} {}{} added", self.added.len(), kind.noun(), plural));
        }
        if !self.duplicates.is_empty() {
            lines.push(format!("Already blocked: {}", self.duplicates.join(", ")));
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// Set union keeping existing entries and their order.
pub fn merge_entries<I, T>(list: &mut BlockList, entries: I) -> MergeStats
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut stats = MergeStats::default();
    for entry in entries {
        let entry = entry.into();
        if list.insert(entry.clone()) {
            stats.added.push(entry);
        } else {
            stats.duplicates.push(entry);
        }
    }
    stats
}

/// Outcome of importing a snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub streamers: MergeStats,
    pub tags: MergeStats,
    pub skipped_lines: usize,
}

impl ImportReport {
    pub fn changed(&self) -> bool {
        self.streamers.changed() || self.tags.changed()
    }

    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = [
            self.streamers.summary(ListKind::Streamers),
            self.tags.summary(ListKind::Tags),
        ]
        .into_iter()
        .flatten()
        .collect();
        if self.skipped_lines > 0 {
            parts.push(format!("{} unrecognized lines skipped", self.skipped_lines));
        }
        if parts.is_empty() {
            "Nothing to import".to_string()
        } else {
            parts.join("\n")
        }
    }
}

/// Merge a parsed snapshot into `config`. Toggles are left untouched.
pub fn import_snapshot(config: &mut BlockConfig, snapshot: &ParsedSnapshot) -> ImportReport {
    let report = ImportReport {
        streamers: merge_entries(&mut config.blocked_streamers, snapshot.streamers.iter().cloned()),
        tags: merge_entries(&mut config.blocked_tags, snapshot.tags.iter().cloned()),
        skipped_lines: snapshot.stats.skipped_lines,
    };
    log::info!(
        "imported {} streamers and {} tags ({} duplicates, {} skipped lines)",
        report.streamers.added.len(),
        report.tags.added.len(),
        report.streamers.duplicates.len() + report.tags.duplicates.len(),
        report.skipped_lines
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_snapshot;

    #[test]
    fn test_import_merges_instead_of_replacing() {
        let mut config = BlockConfig::default();
        config.blocked_streamers.insert("A");

        let parsed = parse_snapshot("[blocked streamers]\nA\nB\n[blocked tags]\n#x\n");
        let report = import_snapshot(&mut config, &parsed);

        assert_eq!(config.blocked_streamers.as_slice(), &["A".to_string(), "B".to_string()]);
        assert_eq!(report.streamers.added, vec!["B".to_string()]);
        assert_eq!(report.streamers.duplicates, vec!["A".to_string()]);
        assert_eq!(report.tags.added, vec!["x".to_string()]);
        assert!(report.changed());
    }

    #[test]
    fn test_repeats_in_input_count_as_duplicates() {
        let mut list = BlockList::new();
        let stats = merge_entries(&mut list, ["a", "b", "a"]);
        assert_eq!(stats.added, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(stats.duplicates, vec!["a".to_string()]);
    }

    #[test]
    fn test_summary_text() {
        let stats = MergeStats {
            added: vec!["B".to_string(), "C".to_string()],
            duplicates: vec!["A".to_string(), "D".to_string()],
        };
        assert_eq!(
            stats.summary(ListKind::Streamers).unwrap(),
            "2 streamers added\nAlready blocked: A, D"
        );

        let single = MergeStats {
            added: vec!["x".to_string()],
            duplicates: Vec::new(),
        };
        assert_eq!(single.summary(ListKind::Tags).unwrap(), "1 tag added");
        assert_eq!(MergeStats::default().summary(ListKind::Tags), None);
    }

    #[test]
    fn test_import_report_summary() {
        let mut config = BlockConfig::default();
        let parsed = parse_snapshot("junk\n[blocked tags]\n#x\n");
        let report = import_snapshot(&mut config, &parsed);
        assert_eq!(report.summary(), "1 tag added\n1 unrecognized lines skipped");

        let empty = import_snapshot(&mut config, &parse_snapshot(""));
        assert_eq!(empty.summary(), "Nothing to import");
        assert!(!empty.changed());
    }
}
