//! Tag recognition within a logical line
//!
//! A logical line yields one *unit*: either a closing tag, or an element tag
//! together with its inline text and, when present on the same line, its
//! closing tag.

use super::line::LogicalLine;
use crate::error::{Error, ErrorKind, Result};

/// An element tag and everything that belongs to it on the same line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementTag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub data: Option<String>,
    /// Self-closing, or closed on the same line: the element has no children
    pub terminal: bool,
    /// Text offset just past the unit
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unit {
    Element(ElementTag),
    Closing { name: String, end: usize },
}

impl Unit {
    pub fn end(&self) -> usize {
        match self {
            Self::Element(tag) => tag.end,
            Self::Closing { end, .. } => *end,
        }
    }
}

/// Read the unit that starts at text offset `at` of `line`.
///
/// Offsets in the returned unit are relative to the whole line text, so a
/// line holding several units is scanned once from left to right.
pub fn scan_unit(line: &LogicalLine, at: usize, input: &str) -> Result<Unit> {
    let text = line.text().get(at..).unwrap_or("");
    let boundary = line
        .boundary()
        .filter(|&boundary| boundary >= at)
        .map(|boundary| boundary - at);
    let fail = |rel: usize, message: &str| {
        let offset = line
            .source_offset(at + rel)
            .unwrap_or_else(|| line.source_start());
        Error::at(ErrorKind::MalformedTag, input, offset, message)
    };

    if let Some(rest) = text.strip_prefix("</") {
        let (name, end) = closing_tag(rest).ok_or_else(|| fail(0, "closing tag is missing '>'"))?;
        if name.is_empty() {
            return Err(fail(0, "closing tag has no name"));
        }
        return Ok(Unit::Closing {
            name: name.to_string(),
            end: at + end + 2,
        });
    }

    let Some(after_lt) = text.strip_prefix('<') else {
        return Err(fail(0, "expected '<' at start of element"));
    };
    if after_lt.starts_with('?') || after_lt.starts_with('!') {
        return Err(fail(0, "unsupported markup"));
    }

    let gt = text
        .find('>')
        .ok_or_else(|| fail(0, "tag is missing closing '>'"))?;
    if boundary.is_some_and(|boundary| boundary <= gt) {
        return Err(fail(0, "tag is missing closing '>'"));
    }
    let body = text.get(1..gt).unwrap_or("");
    if let Some(lt) = body.find('<') {
        return Err(fail(lt + 1, "unexpected '<' inside tag"));
    }

    let tokens = tokenize(body).ok_or_else(|| fail(0, "unterminated attribute quote"))?;
    let Some((first, rest)) = tokens.split_first() else {
        return Err(fail(0, "invalid tag name"));
    };
    let name = first.strip_suffix('/').unwrap_or(*first);
    if name.is_empty() || name.contains(['/', '=', '"', '\'']) {
        return Err(fail(0, "invalid tag name"));
    }

    let mut attributes = Vec::new();
    for (idx, token) in rest.iter().enumerate() {
        if let Some((key, raw)) = token.split_once('=') {
            if key.is_empty() {
                return Err(fail(0, "attribute has no name"));
            }
            let detached = rest
                .get(idx + 1)
                .is_some_and(|next| next.starts_with(['"', '\'']));
            if raw.is_empty() && detached {
                return Err(fail(0, "attribute value must follow '=' directly"));
            }
            let value = attribute_value(raw).ok_or_else(|| fail(0, "malformed attribute value"))?;
            attributes.push((key.to_string(), value.to_string()));
        }
    }

    let after_tag = gt + 1;
    if body.trim_end().ends_with('/') {
        return Ok(Unit::Element(ElementTag {
            name: name.to_string(),
            attributes,
            data: None,
            terminal: true,
            end: at + after_tag,
        }));
    }

    let rest = text.get(after_tag..).unwrap_or("");
    let mut data_len = rest.find('<').unwrap_or(rest.len());
    if let Some(boundary) = boundary {
        data_len = data_len.min(boundary.saturating_sub(after_tag));
    }
    let raw_data = rest.get(..data_len).unwrap_or("");
    let data = (!raw_data.trim().is_empty()).then(|| raw_data.to_string());

    let data_end = after_tag + data_len;
    let (terminal, end) = match text.get(data_end..).and_then(|s| s.strip_prefix("</")) {
        Some(close) => {
            let (close_name, close_end) =
                closing_tag(close).ok_or_else(|| fail(data_end, "closing tag is missing '>'"))?;
            if close_name != name {
                return Err(fail(
                    data_end,
                    format!("mismatched closing tag: expected </{name}>, found </{close_name}>")
                        .as_str(),
                ));
            }
            (true, data_end + 2 + close_end)
        }
        None => (false, data_end),
    };

    Ok(Unit::Element(ElementTag {
        name: name.to_string(),
        attributes,
        data,
        terminal,
        end: at + end,
    }))
}

/// Name of a closing tag (text after `</`) and the offset just past its `>`
fn closing_tag(rest: &str) -> Option<(&str, usize)> {
    let gt = rest.find('>')?;
    let name = rest.get(..gt)?.trim();
    Some((name, gt + 1))
}

/// Split a tag body on whitespace, keeping quoted attribute values whole.
///
/// A quote only opens directly after `=`. Returns `None` for an unterminated
/// quote, except a lone quote at the very end of the body, which reads as an
/// empty value.
fn tokenize(body: &str) -> Option<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut token_start: Option<usize> = None;
    let mut quote: Option<(char, usize)> = None;
    let mut prev = None;

    for (idx, c) in body.char_indices() {
        match quote {
            Some((open, _)) if c == open => quote = None,
            Some(_) => {}
            None if c.is_whitespace() => {
                if let Some(start) = token_start.take() {
                    tokens.push(body.get(start..idx)?);
                }
            }
            None => {
                if token_start.is_none() {
                    token_start = Some(idx);
                }
                if matches!(c, '"' | '\'') && prev == Some('=') {
                    quote = Some((c, idx));
                }
            }
        }
        prev = Some(c);
    }

    if let Some((_, at)) = quote {
        if at + 1 != body.len() {
            return None;
        }
    }
    if let Some(start) = token_start {
        tokens.push(body.get(start..)?);
    }
    Some(tokens)
}

/// Value part of an attribute token (text after `=`)
fn attribute_value(raw: &str) -> Option<&str> {
    let mut chars = raw.chars();
    let quote = match chars.next() {
        None => return Some(""),
        Some(q @ ('"' | '\'')) => q,
        Some(_) => return None,
    };
    let inner = chars.as_str();
    if inner.is_empty() {
        return Some("");
    }
    let (value, trailing) = inner.split_once(quote)?;
    matches!(trailing, "" | "/").then_some(value)
}
