use crate::cursor::{is_number_start, Cursor};
use crate::decoder::{decode, Mode};
use crate::error::{ErrorKind, NumberError, Result};

use super::value::{Style, Styles, Value};

// ── Entry points ──────────────────────────────────────────────────────────

/// Parse a `.tss` style sheet: `name { prop: values; ... } ...`.
pub fn parse_styles(src: &[u8]) -> Result<Styles> {
    let mut cur = Cursor::new(src);
    let mut styles = Styles::new();
    while cur.skip_whitespace().is_some() {
        let name = cur.read_identifier();
        if name.is_empty() {
            return Err(cur.error(ErrorKind::StyleIdent));
        }
        match cur.skip_whitespace() {
            Some(b'{') => {}
            Some(b) => {
                return Err(cur.error(ErrorKind::ExpectedByte { expected: "'{'", found: char::from(b) }));
            }
            None => return Err(cur.error(ErrorKind::UnexpectedEof)),
        }
        cur.advance();
        let style = block(&mut cur, false)?;
        styles.insert(name.to_string(), style);
    }
    log::debug!("parsed style sheet with {} styles", styles.len());
    Ok(styles)
}

/// Parse the body of a single block, as found in a `style="..."` attribute.
/// End of input closes the block.
pub fn parse_style_block(src: &[u8]) -> Result<Style> {
    let mut cur = Cursor::new(src);
    block(&mut cur, true)
}

// ── Grammar ───────────────────────────────────────────────────────────────

/// Cursor just inside `{` (or at the start of an inline block).
fn block(cur: &mut Cursor<'_>, inline: bool) -> Result<Style> {
    let mut style = Style::new();
    loop {
        match cur.skip_whitespace() {
            None if inline => return Ok(style),
            None => return Err(cur.error(ErrorKind::StyleIncomplete)),
            Some(b'}') => {
                cur.advance();
                return Ok(style);
            }
            Some(_) => {}
        }

        let name = cur.read_identifier();
        if name.is_empty() {
            return Err(cur.error(ErrorKind::StyleIdent));
        }

        match cur.skip_whitespace() {
            Some(b'{') => {
                cur.advance();
                let nested = block(cur, false)?;
                style.insert(name.to_string(), vec![Value::Style(nested)]);
            }
            Some(b':') => {
                cur.advance();
                let values = field(cur, name)?;
                style.insert(name.to_string(), values);
            }
            Some(b) => {
                return Err(cur.error(ErrorKind::ExpectedByte {
                    expected: "':' or '{'",
                    found: char::from(b),
                }));
            }
            None => return Err(cur.error(ErrorKind::FieldIncomplete)),
        }
    }
}

/// Value list after `:` up to and including `;`.
fn field(cur: &mut Cursor<'_>, name: &str) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    loop {
        let value = match cur.skip_whitespace() {
            None => return Err(cur.error(ErrorKind::FieldIncomplete)),
            Some(b';') => {
                if values.is_empty() {
                    return Err(cur.error(ErrorKind::NoValues(name.to_string())));
                }
                cur.advance();
                return Ok(values);
            }
            Some(b'{') => {
                cur.advance();
                values.push(Value::Style(block(cur, false)?));
                continue;
            }
            Some(b'"') => {
                cur.advance();
                Value::Str(decode(cur, b'"', Mode::Quoted, None)?)
            }
            Some(b) if is_number_start(b) => number(cur)?,
            Some(_) => {
                let word = cur.read_identifier();
                match word {
                    "" => return Err(cur.error(ErrorKind::ExpectedValue)),
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => Value::Str(word.to_string()),
                }
            }
        };
        values.push(value);

        match cur.current() {
            Some(b' ' | b'\t' | b'\r' | b'\n' | b';') | None => {}
            Some(b) => {
                return Err(cur.error(ErrorKind::ExpectedByte {
                    expected: "' ' or ';'",
                    found: char::from(b),
                }));
            }
        }
    }
}

/// Numeric literal with an optional `i`, `f` or `u` suffix.
fn number(cur: &mut Cursor<'_>) -> Result<Value> {
    let Some(text) = cur.read_number() else {
        return Err(cur.error(ErrorKind::ExpectedValue));
    };

    let suffix = cur.current();
    let parsed = match suffix {
        Some(b'i') => text.parse().map(Value::Int).map_err(NumberError::from),
        Some(b'f') => text.parse().map(Value::Float).map_err(NumberError::from),
        Some(b'u') => text.parse().map(Value::Uint).map_err(NumberError::from),
        _ if text.contains('.') => text.parse().map(Value::Float).map_err(NumberError::from),
        _ => text.parse().map(Value::Int).map_err(NumberError::from),
    };
    let value = parsed.map_err(|source| {
        cur.error(ErrorKind::Number { text: text.to_string(), source })
    })?;

    if matches!(suffix, Some(b'i' | b'f' | b'u')) {
        cur.advance();
    }
    Ok(value)
}
