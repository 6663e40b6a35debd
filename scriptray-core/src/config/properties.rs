//! Reader and writer for the flat `key=value` settings format.
//!
//! This is the classic `.properties` layout, so files written by other
//! tools load unchanged. Supported: `#`/`!` comments, `=`, `:` or whitespace
//! separators, backslash continuations and `\uXXXX` escapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

/// Parse properties text into an ordered key/value map.
///
/// Parsing never fails. Malformed escapes are kept literally and a later
/// duplicate key overwrites an earlier one.
pub fn parse(input: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    let mut lines = input.lines();

    while let Some(raw) = lines.next() {
        let line = raw.trim_start_matches(is_blank);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut logical = line.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        entries.insert(unescape(key), unescape(value));
    }

    entries
}

/// Serialize entries with a comment header and the current local time.
pub fn serialize(entries: &BTreeMap<String, String>, comment: &str) -> String {
    serialize_at(entries, comment, Local::now())
}

/// Serialize entries with an explicit timestamp.
pub fn serialize_at(
    entries: &BTreeMap<String, String>,
    comment: &str,
    timestamp: DateTime<Local>,
) -> String {
    let mut out = String::new();

    if !comment.is_empty() {
        for line in comment.lines() {
            out.push('#');
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('#');
    out.push_str(&timestamp.format("%a %b %d %H:%M:%S %z %Y").to_string());
    out.push('\n');

    for (key, value) in entries {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }

    out
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    trailing % 2 == 1
}

/// Split a logical line at the first unescaped separator.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut split: Option<(usize, usize, bool)> = None;

    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                split = Some((idx, idx + 1, false));
                break;
            }
            c if is_blank(c) => {
                split = Some((idx, idx + c.len_utf8(), true));
                break;
            }
            _ => {}
        }
    }

    let Some((key_end, value_start, blank_separator)) = split else {
        return (line, "");
    };

    let mut rest = line[value_start..].trim_start_matches(is_blank);
    if blank_separator {
        if let Some(stripped) = rest.strip_prefix(|c| c == '=' || c == ':') {
            rest = stripped.trim_start_matches(is_blank);
        }
    }

    (&line[..key_end], rest)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.push(ch);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    None => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

fn escape(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());

    for (idx, c) in raw.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || idx == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }

    out
}
