//! Module documentation block parser.
//!
//! Modules carry their documentation as top-level Python string assignments:
//! - `DOCUMENTATION = '''<yaml>'''` — the field mapping (required)
//! - `EXAMPLES = '''...'''` — usage examples (optional, kept raw)
//! - `RETURN = '''...'''` — return value docs (optional, kept raw)
//!
//! Either triple-quote style is accepted, with an optional `r`/`u`/`b` prefix.
//! Bodies of non-raw literals have their backslash escapes decoded.
//!
//! Module docs are written against YAML 1.1, where plain `yes`/`no`/`on`/`off`
//! are booleans. `serde_yaml` implements YAML 1.2, so those scalars are
//! rewritten to `true`/`false` before parsing.

use std::borrow::Cow;
use std::collections::HashMap;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;
use std::sync::LazyLock;

use ansible_data_shared::{AnsibleDataError, Result};
use regex::Regex;
use tracing::{debug, instrument};

use crate::DocParser;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Parsed representation of a module's documentation.
#[derive(Debug, Clone, Default)]
pub struct ParsedDoc {
    /// Top-level keys of the DOCUMENTATION mapping.
    pub fields: serde_json::Map<String, serde_json::Value>,
    /// Raw EXAMPLES text, if present.
    pub examples: Option<String>,
    /// Raw RETURN text, if present.
    pub returns: Option<String>,
}

/// [`DocParser`] reading YAML documentation blocks from module source files.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDocParser;

impl DocParser for YamlDocParser {
    fn parse(&self, path: &Path) -> Result<ParsedDoc> {
        let source = std::fs::read_to_string(path).map_err(|e| AnsibleDataError::io(path, e))?;
        parse_docstring(&source)
    }
}

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches the opening of a documentation assignment at column 0.
static BLOCK_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(DOCUMENTATION|EXAMPLES|RETURN)[ \t]*=[ \t]*([rRuUbB]{0,2})('''|""")"#)
        .expect("doc block regex")
});

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse the documentation blocks out of a module's source text.
#[instrument(skip_all, fields(len = source.len()))]
pub fn parse_docstring(source: &str) -> Result<ParsedDoc> {
    let blocks = string_blocks(source)?;

    let documentation = blocks
        .get("DOCUMENTATION")
        .ok_or_else(|| AnsibleDataError::parse("no DOCUMENTATION block"))?;

    let documentation = resolve_yaml11_booleans(documentation);
    let yaml: serde_yaml::Value = serde_yaml::from_str(&documentation)
        .map_err(|e| AnsibleDataError::parse(format!("malformed DOCUMENTATION yaml: {e}")))?;

    let fields = match serde_json::to_value(&yaml) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(other) => {
            return Err(AnsibleDataError::parse(format!(
                "DOCUMENTATION is not a mapping (found {})",
                json_kind(&other)
            )));
        }
        Err(e) => {
            return Err(AnsibleDataError::parse(format!(
                "DOCUMENTATION cannot be represented as JSON: {e}"
            )));
        }
    };

    debug!(fields = fields.len(), "documentation parsed");

    Ok(ParsedDoc {
        fields,
        examples: blocks.get("EXAMPLES").map(|s| s.to_string()),
        returns: blocks.get("RETURN").map(|s| s.to_string()),
    })
}

/// Collect the decoded body of the first assignment to each documentation name.
fn string_blocks(source: &str) -> Result<HashMap<&str, Cow<'_, str>>> {
    let mut blocks = HashMap::new();

    for caps in BLOCK_START_RE.captures_iter(source) {
        let (Some(name), Some(prefix), Some(quote)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        if blocks.contains_key(name.as_str()) {
            continue;
        }

        let rest = &source[quote.end()..];
        let end = find_closing_quote(rest, quote.as_str()).ok_or_else(|| {
            AnsibleDataError::parse(format!("unterminated {} block", name.as_str()))
        })?;
        let body = &rest[..end];

        let body = if prefix.as_str().contains(['r', 'R']) {
            Cow::Borrowed(body)
        } else {
            unescape_python(body).map_err(|e| {
                AnsibleDataError::parse(format!("invalid escape in {} block: {e}", name.as_str()))
            })?
        };

        blocks.insert(name.as_str(), body);
    }

    Ok(blocks)
}

/// Byte offset of the closing triple quote. A backslash always consumes the
/// next character, raw literals included.
fn find_closing_quote(body: &str, quote: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(quote.as_bytes()) {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Decode Python string-literal escapes. Unknown escapes (and `\N{...}`) are
/// kept verbatim.
fn unescape_python(body: &str) -> std::result::Result<Cow<'_, str>, String> {
    if !body.contains('\\') {
        return Ok(Cow::Borrowed(body));
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(next),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut code = next as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or_else(|| format!("octal escape {code:o}"))?);
            }
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' => out.push(hex_escape(&mut chars, 4)?),
            'U' => out.push(hex_escape(&mut chars, 8)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(Cow::Owned(out))
}

fn hex_escape(chars: &mut Peekable<Chars<'_>>, digits: usize) -> std::result::Result<char, String> {
    let mut code = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| format!("truncated {digits}-digit hex escape"))?;
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or_else(|| format!("code point {code:#x} out of range"))
}

// ---------------------------------------------------------------------------
// YAML 1.1 booleans
// ---------------------------------------------------------------------------

const YAML11_TRUE: [&str; 6] = ["yes", "Yes", "YES", "on", "On", "ON"];
const YAML11_FALSE: [&str; 6] = ["no", "No", "NO", "off", "Off", "OFF"];

fn yaml11_bool(word: &str) -> Option<&'static str> {
    if YAML11_TRUE.contains(&word) {
        Some("true")
    } else if YAML11_FALSE.contains(&word) {
        Some("false")
    } else {
        None
    }
}

/// Rewrite plain `yes`/`no`/`on`/`off` scalars to `true`/`false`.
///
/// Works line by line on block mappings, block sequence items and flow
/// sequences. Quoted scalars and block scalar (`|`, `>`) contents are untouched.
fn resolve_yaml11_booleans(text: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(text.len());
    let mut changed = false;
    let mut block_indent: Option<usize> = None;

    for line in text.split_inclusive('\n') {
        let indent = line.len() - line.trim_start_matches(' ').len();

        if let Some(parent) = block_indent {
            if line.trim().is_empty() || indent > parent {
                out.push_str(line);
                continue;
            }
            block_indent = None;
        }

        let Some((start, end)) = scalar_span(line, indent) else {
            out.push_str(line);
            continue;
        };
        let value = &line[start..end];

        if is_block_scalar_header(value) {
            block_indent = Some(indent);
            out.push_str(line);
        } else if let Some(word) = yaml11_bool(value) {
            out.push_str(&line[..start]);
            out.push_str(word);
            out.push_str(&line[end..]);
            changed = true;
        } else if let Some(flow) = rewrite_flow_sequence(value) {
            out.push_str(&line[..start]);
            out.push_str(&flow);
            out.push_str(&line[end..]);
            changed = true;
        } else {
            out.push_str(line);
        }
    }

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(text)
    }
}

/// Byte range of the value on a `key: value` or `- value` line, without any
/// trailing comment.
fn scalar_span(line: &str, indent: usize) -> Option<(usize, usize)> {
    let mut start = indent;
    let mut in_sequence = false;
    while line[start..].starts_with("- ") {
        start += 2;
        start += line[start..].len() - line[start..].trim_start_matches(' ').len();
        in_sequence = true;
    }

    let rest = &line[start..];
    if rest.starts_with(['#', '\'', '"']) {
        return None;
    }
    match rest.find(": ") {
        Some(colon) => {
            start += colon + 2;
            start += line[start..].len() - line[start..].trim_start_matches(' ').len();
        }
        None if in_sequence => {}
        None => return None,
    }

    let value = &line[start..];
    let value = match value.find(" #") {
        Some(comment) => &value[..comment],
        None => value,
    };
    let value = value.trim_end();
    if value.is_empty() {
        return None;
    }
    Some((start, start + value.len()))
}

fn is_block_scalar_header(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some('|' | '>'))
        && chars.all(|c| c == '+' || c == '-' || c.is_ascii_digit())
}

/// `[ yes, no ]` → `[ true, false ]`; `None` when nothing changes.
fn rewrite_flow_sequence(value: &str) -> Option<String> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    if inner.contains(['[', ']', '{', '}']) {
        return None;
    }

    let mut quotes_seen = 0;
    let mut changed = false;
    let items: Vec<String> = inner
        .split(',')
        .map(|item| {
            let inside_quotes = quotes_seen % 2 == 1;
            quotes_seen += item.matches(['\'', '"']).count();
            match yaml11_bool(item.trim()) {
                Some(word) if !inside_quotes => {
                    changed = true;
                    item.replacen(item.trim(), word, 1)
                }
                _ => item.to_string(),
            }
        })
        .collect();

    changed.then(|| format!("[{}]", items.join(",")))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "nothing",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a mapping",
    }
}
