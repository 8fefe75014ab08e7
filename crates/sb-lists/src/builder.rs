use sb_core::BlockList;

use crate::parser::{COMMENT_PREFIX, ESCAPE_PREFIX, STREAMER_SECTION, TAG_PREFIX, TAG_SECTION};

/// First line of every exported file.
pub const SNAPSHOT_HEADER: &str = "SoopBlock block list";

/// Render both lists in the snapshot text format.
pub fn build_snapshot(streamers: &BlockList, tags: &BlockList) -> String {
    let mut out = String::new();

    push_line(&mut out, &format!("{} {}", COMMENT_PREFIX, SNAPSHOT_HEADER));
    out.push('\n');

    push_line(&mut out, &format!("[{}]", STREAMER_SECTION));
    for streamer in streamers {
        if needs_escape(streamer) {
            push_line(&mut out, &format!("{}{}", ESCAPE_PREFIX, streamer));
        } else {
            push_line(&mut out, streamer);
        }
    }
    out.push('\n');

    push_line(&mut out, &format!("[{}]", TAG_SECTION));
    for tag in tags {
        push_line(&mut out, &format!("{}{}", TAG_PREFIX, tag));
    }
    out.push('\n');

    push_line(
        &mut out,
        &format!(
            "{} total: {} streamers, {} tags",
            COMMENT_PREFIX,
            streamers.len(),
            tags.len()
        ),
    );
    out
}

/// Names the parser would take for a comment, a header or an escape.
fn needs_escape(entry: &str) -> bool {
    entry.starts_with(COMMENT_PREFIX) || entry.starts_with('[') || entry.starts_with(ESCAPE_PREFIX)
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_snapshot;

    #[test]
    fn test_layout() {
        let streamers: BlockList = ["A", "B"].into_iter().collect();
        let tags: BlockList = ["x"].into_iter().collect();
        let text = build_snapshot(&streamers, &tags);
        assert_eq!(
            text,
            "! SoopBlock block list\n\n\
             [blocked streamers]\nA\nB\n\n\
             [blocked tags]\n#x\n\n\
             ! total: 2 streamers, 1 tags\n"
        );
    }

    #[test]
    fn test_export_reads_back() {
        let streamers: BlockList = ["A"].into_iter().collect();
        let tags: BlockList = ["#odd", "plain"].into_iter().collect();
        let parsed = parse_snapshot(&build_snapshot(&streamers, &tags));
        assert_eq!(parsed.streamers, streamers);
        assert_eq!(parsed.tags, tags);
        assert_eq!(parsed.stats.skipped_lines, 0);
    }

    #[test]
    fn test_names_that_look_like_markup_read_back() {
        let streamers: BlockList = ["!Bang", "[blocked tags]", "\\slash", "A"].into_iter().collect();
        let tags: BlockList = ["!t", "[x]"].into_iter().collect();
        let text = build_snapshot(&streamers, &tags);
        assert!(text.contains("\n\\!Bang\n"));

        let parsed = parse_snapshot(&text);
        assert_eq!(parsed.streamers, streamers);
        assert_eq!(parsed.tags, tags);
        assert_eq!(parsed.stats.skipped_lines, 0);
    }

    #[test]
    fn test_empty_lists() {
        let text = build_snapshot(&BlockList::new(), &BlockList::new());
        assert!(text.ends_with("! total: 0 streamers, 0 tags\n"));
    }
}
