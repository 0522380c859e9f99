//! Plain-text rendering of element trees and styles.
//!
//! Keys are sorted so output is stable between runs.

use std::fmt::{self, Write};

use trellis::{Element, Style, Styles, Value};

const INDENT: &str = "  ";

pub fn tree(root: &Element) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for child in &root.children {
        element(&mut out, child, 0)?;
    }
    Ok(out)
}

fn element(out: &mut String, el: &Element, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    if el.is_text() {
        let content = el.first(trellis::TEXT).unwrap_or_default();
        return writeln!(out, "{pad}{:?}", content);
    }

    write!(out, "{pad}<{}", el.name)?;
    let mut keys: Vec<_> = el.attributes.keys().collect();
    keys.sort();
    for key in keys {
        match el.attributes[key].as_slice() {
            [single] => write!(out, " {key}={single:?}")?,
            list => write!(out, " {key}={list:?}")?,
        }
    }
    writeln!(out, ">")?;

    if let Some(style) = &el.style {
        write!(out, "{pad}{INDENT}style ")?;
        block(out, style, depth + 1)?;
        writeln!(out)?;
    }
    for child in &el.children {
        element(out, child, depth + 1)?;
    }
    Ok(())
}

pub fn sheet(styles: &Styles) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let mut names: Vec<_> = styles.keys().collect();
    names.sort();
    for name in names {
        write!(out, "{name} ")?;
        block(&mut out, &styles[name], 0)?;
        writeln!(out)?;
    }
    Ok(out)
}

fn block(out: &mut String, style: &Style, depth: usize) -> fmt::Result {
    if style.is_empty() {
        return write!(out, "{{}}");
    }
    let pad = INDENT.repeat(depth);
    writeln!(out, "{{")?;
    let mut keys: Vec<_> = style.keys().collect();
    keys.sort();
    for key in keys {
        write!(out, "{pad}{INDENT}{key}:")?;
        for v in &style[key] {
            out.push(' ');
            value(out, v, depth + 1)?;
        }
        writeln!(out, ";")?;
    }
    write!(out, "{pad}}}")
}

/// Writes `v` so that the style parser reads it back as the same value.
fn value(out: &mut String, v: &Value, depth: usize) -> fmt::Result {
    match v {
        Value::Int(i) => write!(out, "{i}"),
        // Display never switches to exponent notation, which numbers cannot hold
        Value::Float(f) => write!(out, "{f}f"),
        Value::Uint(u) => write!(out, "{u}u"),
        Value::Bool(b) => write!(out, "{b}"),
        Value::Str(s) if is_bare(s) => out.write_str(s),
        Value::Str(s) => quoted(out, s),
        Value::Style(s) => block(out, s, depth),
    }
}

/// Quoted string in the escapes the decoder understands. Raw tabs and
/// newlines would decode as spaces, and a lone `{` opens an interpolation.
fn quoted(out: &mut String, s: &str) -> fmt::Result {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("{{"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_ascii_control() => write!(out, "\\x{:02X}", u32::from(c))?,
            c if c.is_control() => write!(out, "\\u{:04X}", u32::from(c))?,
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(())
}

fn is_bare(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && s != "true"
        && s != "false"
}
