use std::sync::OnceLock;

use regex::Regex;

/// Separator used when several source lines are shown as one paragraph.
pub const LINE_SEPARATOR: &str = " ";

const COMMENT_MARKER: char = '#';

fn translators_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?i:translators:) ?").unwrap())
}

pub fn old_msgid_text(lines: &[String]) -> String {
    lines.join(LINE_SEPARATOR)
}

/// Joins extracted comments, dropping a leading `TRANSLATORS:` tag.
pub fn auto_comment_text(lines: &[String]) -> String {
    let joined = lines.join(LINE_SEPARATOR);
    let stripped = translators_marker().replace(&joined, "");
    stripped.trim().to_string()
}

/// Strips `#` (plus one space) from the start of every line of a translator
/// comment.
pub fn remove_start_hash(comment: &str) -> String {
    comment
        .lines()
        .map(|line| {
            let line = line.strip_prefix(COMMENT_MARKER).unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn comment_text(comment: &str) -> String {
    remove_start_hash(comment).trim().to_string()
}
