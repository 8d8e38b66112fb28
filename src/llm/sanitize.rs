//! Strips Markdown code fences models like to wrap around SQL.

use tracing::debug;

const FENCE: &str = "```";

/// Returns the SQL inside the first fenced block of `raw`, or `raw` itself
/// when there is no fence. The result is always trimmed.
///
/// - no fence: the trimmed input
/// - "```sql\n...\n```" or "```\n...\n```": the block body
/// - an opening fence with no closing fence: everything after the opening line
/// - "```SELECT 1```" on one line: the text between the markers
pub fn sanitize_sql(raw: &str) -> String {
    let text = raw.trim();

    let Some(open) = text.find(FENCE) else {
        return text.to_string();
    };

    let after_open = &text[open + FENCE.len()..];

    // The rest of the opening line is a language tag ("sql", "postgresql", "")
    // unless it looks like the start of the statement itself. A known tag
    // followed by the statement on the same line is dropped too.
    let body = match after_open.split_once('\n') {
        Some((first_line, rest)) if is_language_tag(first_line) => rest,
        None if is_language_tag(after_open) => "",
        _ => strip_inline_tag(after_open),
    };

    let body = match body.find(FENCE) {
        Some(close) => &body[..close],
        None => {
            debug!("Model output has an opening code fence but no closing fence");
            body
        }
    };

    body.trim().to_string()
}

/// Tags seen in front of SQL on the same line as the opening fence.
const INLINE_TAGS: &[&str] = &[
    "sql", "postgresql", "postgres", "pgsql", "plpgsql", "psql", "mysql", "sqlite", "duckdb",
    "tsql",
];

/// Keywords that can make up a whole first line of a statement.
const STATEMENT_KEYWORDS: &[&str] = &["select", "with", "insert", "update", "delete"];

fn is_language_tag(line: &str) -> bool {
    let line = line.trim();
    line.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'))
        && !STATEMENT_KEYWORDS
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(line))
}

fn strip_inline_tag(text: &str) -> &str {
    let text = text.trim_start();
    let word_end = text.find(char::is_whitespace).unwrap_or(text.len());
    let (word, rest) = text.split_at(word_end);
    if !rest.is_empty() && INLINE_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(word)) {
        rest
    } else {
        text
    }
}
