//! Reader for the properties text format used by rule files
//!
//! Supported syntax: `key=value`, `key: value` and `key value`, comment
//! lines starting with `#` or `!`, and backslash line continuation.
//! Backslash escapes `\=`, `\:`, `\ `, `\t` and `\n` are honoured in keys
//! and values.

use std::collections::BTreeMap;

/// Parse properties text into an ordered map. Later keys replace earlier ones.
#[must_use]
pub fn parse(text: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    for line in logical_lines(text) {
        let (key, value) = split_entry(&line);
        if !key.is_empty() {
            properties.insert(key, value);
        }
    }
    properties
}

fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.lines() {
        let trimmed = raw.trim_start();
        let continuing = pending.is_some();
        if !continuing && (trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!'))
        {
            continue;
        }

        let mut current = pending.take().unwrap_or_default();
        let (body, continues) = strip_continuation(trimmed);
        current.push_str(body);
        if continues {
            pending = Some(current);
        } else {
            lines.push(current);
        }
    }
    if let Some(rest) = pending {
        lines.push(rest);
    }
    lines
}

/// A line continues when it ends in an odd number of backslashes.
fn strip_continuation(line: &str) -> (&str, bool) {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    if trailing % 2 == 1 {
        (&line[..line.len() - 1], true)
    } else {
        (line, false)
    }
}

fn split_entry(line: &str) -> (String, String) {
    let mut key = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    key.push(unescape(escaped));
                }
            }
            '=' | ':' => break,
            c if c.is_whitespace() => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                if chars.peek().is_some_and(|c| *c == '=' || *c == ':') {
                    chars.next();
                }
                break;
            }
            c => key.push(c),
        }
    }

    let rest: String = chars.collect();
    let mut value = String::new();
    let mut rest_chars = rest.trim_start().chars();
    while let Some(c) = rest_chars.next() {
        if c == '\\' {
            if let Some(escaped) = rest_chars.next() {
                value.push(unescape(escaped));
            }
        } else {
            value.push(c);
        }
    }

    (key, value.trim_end().to_string())
}

fn unescape(c: char) -> char {
    match c {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        other => other,
    }
}
