//! Heuristic source analysis for completion and hover.
//!
//! The parser stops at the first error and files are rarely complete at the
//! cursor, so completion works on the raw text instead of the element tree.

use std::collections::BTreeSet;

use tower_lsp::lsp_types::Position;

const COMMENT: &str = "<#>";

// ── Context kind ──────────────────────────────────────────────────────────────

/// What the cursor is positioned inside, used to drive completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Context {
    /// Right after `<` (or `<!`): an element or prefab name is expected.
    Tag,
    /// Inside an opening tag, past its name: an attribute name is expected.
    Attribute { element: String },
    /// After `name=` inside an opening tag.
    Value { element: String, attribute: String },
    /// Free text, comments, or anything else.
    Unknown,
}

// ── word_at ───────────────────────────────────────────────────────────────────

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Identifier (or partial identifier) containing or immediately preceding the
/// cursor column.
pub fn word_at<'t>(text: &'t str, pos: &Position) -> Option<&'t str> {
    let line = text.lines().nth(pos.line as usize)?;
    let col = clamp(line, pos.character as usize);

    let start = line[..col].rfind(|c: char| !is_word(c)).map(|i| i + 1).unwrap_or(0);
    let end = col + line[col..].find(|c: char| !is_word(c)).unwrap_or(line.len() - col);

    (start < end).then(|| &line[start..end])
}

// ── completion_context ────────────────────────────────────────────────────────

/// Classify the cursor position for completion.
pub fn completion_context(text: &str, pos: &Position) -> Context {
    let before = text_before(text, pos);
    if in_comment(&before) {
        return Context::Unknown;
    }

    let Some(open) = before.rfind('<') else {
        return Context::Unknown;
    };
    if before[open..].contains('>') {
        return Context::Unknown;
    }

    let tag = &before[open + 1..];
    let tag = tag.strip_prefix('!').unwrap_or(tag);
    if tag.starts_with('/') || tag.starts_with('#') {
        return Context::Unknown;
    }

    let Some(name_end) = tag.find(|c: char| !is_word(c)) else {
        return Context::Tag;
    };
    let element = tag[..name_end].to_string();
    if element.is_empty() {
        return Context::Unknown;
    }

    // Quotes are balanced outside values; an odd count means we are inside one.
    let rest = &tag[name_end..];
    if rest.matches('"').count() % 2 == 1 {
        return Context::Unknown;
    }
    let last = rest.rsplit(' ').next().unwrap_or_default();
    match last.split_once('=') {
        Some((attribute, _)) => Context::Value { element, attribute: attribute.to_string() },
        None => Context::Attribute { element },
    }
}

// ── tag_names ─────────────────────────────────────────────────────────────────

/// Every element name opened in `text`, outside comments. Names defined as
/// prefabs (`<!name>`) are left out, uses included, since a prefab may not
/// share its name with a definition.
pub fn tag_names(text: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut prefabs = BTreeSet::new();
    let mut rest = text;
    while let Some(i) = rest.find('<') {
        rest = &rest[i + 1..];
        if let Some(body) = rest.strip_prefix("#>") {
            match body.find(COMMENT) {
                Some(end) => rest = &body[end + COMMENT.len()..],
                None => break,
            }
            continue;
        }
        let (target, tag) = match rest.strip_prefix('!') {
            Some(tag) => (&mut prefabs, tag),
            None => (&mut names, rest),
        };
        let end = tag.find(|c: char| !is_word(c)).unwrap_or(tag.len());
        if end > 0 {
            target.insert(tag[..end].to_string());
        }
    }
    names.retain(|n| !prefabs.contains(n));
    names
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn in_comment(before: &str) -> bool {
    before.matches(COMMENT).count() % 2 == 1
}

fn clamp(line: &str, col: usize) -> usize {
    let mut col = col.min(line.len());
    while !line.is_char_boundary(col) {
        col -= 1;
    }
    col
}

/// Source text from the beginning of the file up to `pos`.
pub fn text_before(text: &str, pos: &Position) -> String {
    let line_idx = pos.line as usize;
    let mut out = String::new();
    for (i, line) in text.lines().enumerate() {
        if i < line_idx {
            out.push_str(line);
            out.push('\n');
        } else {
            out.push_str(&line[..clamp(line, pos.character as usize)]);
            break;
        }
    }
    out
}
