//! Parser for `.env` files.
//!
//! Accepts `KEY=value` lines with optional `export ` prefix, `#` comments,
//! and single, double, or backtick quoting. Double-quoted values expand
//! `\n` escapes and may span lines. Malformed lines are skipped.

use std::collections::BTreeMap;

/// Parses dotenv text into a map. Later keys override earlier ones.
#[must_use]
pub fn parse_dotenv(input: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    let mut lines = input.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, rest)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if !is_valid_key(key) {
            continue;
        }

        let rest = rest.trim_start();
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'' | '`')) => read_quoted(&rest[1..], quote, &mut lines),
            _ => strip_inline_comment(rest).trim_end().to_string(),
        };
        let _ = vars.insert(key.to_string(), value);
    }
    vars
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

fn strip_inline_comment(value: &str) -> &str {
    value.find(" #").map_or(value, |pos| &value[..pos])
}

/// Reads a quoted value starting after the opening quote, continuing onto
/// following lines until the closing quote. An unterminated quote keeps
/// the opening character literally, as a single-line value.
fn read_quoted<'a>(first: &str, quote: char, lines: &mut impl Iterator<Item = &'a str>) -> String {
    if let Some(end) = first.find(quote) {
        return unescape(&first[..end], quote);
    }

    let mut buffer = first.to_string();
    for next in lines.by_ref() {
        buffer.push('\n');
        if let Some(end) = next.find(quote) {
            buffer.push_str(&next[..end]);
            return unescape(&buffer, quote);
        }
        buffer.push_str(next);
    }

    tracing::debug!("unterminated quoted value in env file");
    format!("{quote}{}", first.trim_end())
}

fn unescape(value: &str, quote: char) -> String {
    if quote == '"' {
        value.replace("\\n", "\n").replace("\\r", "\r")
    } else {
        value.to_string()
    }
}
