//! Decoding of quoted strings and free text runs.
//!
//! The decoder consumes bytes up to a caller-chosen terminator, resolving
//! backslash escapes and `{name}` template markers on the way.

use crate::cursor::{is_ident, Cursor};
use crate::element::{Slot, TemplateBinding};
use crate::error::{ErrorKind, Result};

/// Destination for `{name}` markers found while decoding.
///
/// Without a sink (outside prefab definitions) a marker is an error.
pub struct Templates<'a> {
    pub bindings: &'a mut Vec<TemplateBinding>,
    pub target: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Inside `"..."`: the terminator is consumed.
    Quoted,
    /// Free text: whitespace runs collapse to one space, trailing whitespace
    /// is trimmed, the terminator is left in place and end of input ends the run.
    Text,
}

/// Decodes from the current byte up to `terminator`.
///
/// In [`Mode::Quoted`] the cursor must sit just after the opening quote and
/// ends just after the closing one.
pub fn decode(
    cur: &mut Cursor<'_>,
    terminator: u8,
    mode: Mode,
    mut templates: Option<Templates<'_>>,
) -> Result<String> {
    let collapse = mode == Mode::Text;
    let mut out = String::new();
    // last pushed char was a space
    let mut after_space = false;

    loop {
        let Some(b) = cur.current() else {
            if mode == Mode::Text {
                break;
            }
            return Err(cur.error(ErrorKind::StringNotTerminated));
        };

        if b == terminator {
            if mode == Mode::Quoted {
                cur.advance();
            }
            break;
        }

        match b {
            b'\\' => {
                let c = escape(cur, terminator)?;
                out.push(c);
                // an escaped space is kept but still swallows the raw run after it
                after_space = c == ' ';
            }
            b' ' | b'\t' | b'\r' | b'\n' => {
                if b == b'\n' {
                    cur.newline();
                }
                cur.advance();
                if collapse && after_space {
                    continue;
                }
                out.push(' ');
                after_space = true;
            }
            b'{' => {
                template(cur, &mut templates, &mut out)?;
                after_space = false;
            }
            b if b.is_ascii() => {
                out.push(char::from(b));
                cur.advance();
                after_space = false;
            }
            _ => {
                out.push(rune(cur)?);
                after_space = false;
            }
        }
    }

    if collapse {
        let trimmed = out.trim_end_matches([' ', '\t', '\r', '\n']).len();
        out.truncate(trimmed);
    }
    Ok(out)
}

/// Decodes one multi-byte UTF-8 sequence starting at the current byte.
fn rune(cur: &mut Cursor<'_>) -> Result<char> {
    let rest = &cur.source()[cur.pos()..];
    let width = match rest[0] {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Err(cur.error(ErrorKind::InvalidRune)),
    };
    let c = rest
        .get(..width)
        .and_then(|seq| std::str::from_utf8(seq).ok())
        .and_then(|s| s.chars().next())
        .ok_or_else(|| cur.error(ErrorKind::InvalidRune))?;
    cur.set(cur.pos() + width);
    Ok(c)
}

/// Cursor on `\`; leaves it after the last byte of the escape.
fn escape(cur: &mut Cursor<'_>, terminator: u8) -> Result<char> {
    let b = cur.advance_or(ErrorKind::EscapeIncomplete)?;
    let c = match b {
        b'a' => '\u{07}',
        b'b' => '\u{08}',
        b'f' => '\u{0C}',
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'v' => '\u{0B}',
        b'\\' | b'"' | b' ' => char::from(b),
        b if b == terminator => char::from(b),
        b'0'..=b'7' => return octal(cur),
        b'x' => return hex(cur, 2),
        b'u' => return hex(cur, 4),
        b'U' => return hex(cur, 8),
        _ => return Err(cur.error(ErrorKind::EscapeIdent)),
    };
    cur.advance();
    Ok(c)
}

/// `\NNN`, cursor on the first digit.
fn octal(cur: &mut Cursor<'_>) -> Result<char> {
    let mut v = u32::from(cur.current().unwrap_or(b'0') - b'0');
    for _ in 0..2 {
        let b = cur.advance_or(ErrorKind::EscapeIncomplete)?;
        if !(b'0'..=b'7').contains(&b) {
            return Err(cur.error(ErrorKind::EscapeIllegal("bytes from '0' to '7'")));
        }
        v = (v << 3) | u32::from(b - b'0');
    }
    if v > 255 {
        return Err(cur.error(ErrorKind::EscapeOverflow(255)));
    }
    cur.advance();
    // v <= 255 always maps to a char
    Ok(char::from(v as u8))
}

/// `\xHH`, `\uHHHH`, `\UHHHHHHHH`, cursor on the letter.
fn hex(cur: &mut Cursor<'_>, digits: usize) -> Result<char> {
    let mut v: u32 = 0;
    for _ in 0..digits {
        let b = cur.advance_or(ErrorKind::EscapeIncomplete)?;
        let Some(d) = char::from(b).to_digit(16) else {
            return Err(cur.error(ErrorKind::EscapeIllegal("hex bytes")));
        };
        v = (v << 4) | d;
    }
    if v > char::MAX as u32 {
        return Err(cur.error(ErrorKind::EscapeOverflow(char::MAX as u32)));
    }
    let c = char::from_u32(v).ok_or_else(|| cur.error(ErrorKind::InvalidRune))?;
    cur.advance();
    Ok(c)
}

/// Cursor on `{`. `{{` yields a literal `{`; `{name}` is recorded as an
/// interpolation binding and kept verbatim in `out` for later splicing.
fn template(
    cur: &mut Cursor<'_>,
    templates: &mut Option<Templates<'_>>,
    out: &mut String,
) -> Result<()> {
    let b = cur.advance_or(ErrorKind::StringNotTerminated)?;
    if b == b'{' {
        out.push('{');
        cur.advance();
        return Ok(());
    }
    let Some(sink) = templates.as_mut() else {
        return Err(cur.error(ErrorKind::TemplateOutside));
    };
    if !is_ident(b) {
        return Err(cur.error(ErrorKind::TemplateIdent));
    }
    let name = cur.read_identifier();
    if cur.current() != Some(b'}') {
        return Err(cur.error(ErrorKind::TemplateIdent));
    }
    cur.advance();

    sink.bindings.push(TemplateBinding::new(name, sink.target, Slot::Interpolated));
    out.push('{');
    out.push_str(name);
    out.push('}');
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted(src: &str) -> Result<String> {
        let mut bindings = Vec::new();
        let mut cur = Cursor::new(src.as_bytes());
        decode(&mut cur, b'"', Mode::Quoted, Some(Templates { bindings: &mut bindings, target: "t" }))
    }

    fn ok(src: &str, want: &str) {
        assert_eq!(quoted(src).unwrap(), want);
    }

    fn err(src: &str, kind: ErrorKind) {
        assert_eq!(quoted(src).unwrap_err().kind, kind);
    }

    #[test] fn simple() { ok("hello there\"", "hello there"); }
    #[test] fn multibyte() { ok("они\"", "они"); }
    #[test] fn truncated_rune() {
        let mut cur = Cursor::new(b"\xF0\"");
        let e = decode(&mut cur, b'"', Mode::Quoted, None).unwrap_err();
        assert_eq!(e.kind, ErrorKind::InvalidRune);
    }
    #[test] fn not_terminated() { err("asd", ErrorKind::StringNotTerminated); }
    #[test] fn escape_not_terminated() { err("\\", ErrorKind::EscapeIncomplete); }
    #[test] fn control_escapes() {
        ok(r#"\a\b\v\n\r\t\f\\\"""#, "\u{07}\u{08}\u{0B}\n\r\t\u{0C}\\\"");
    }
    #[test] fn same_char_four_ways() {
        for src in [r#"\101""#, r#"\x41""#, r#"\u0041""#, r#"\U00000041""#] {
            ok(src, "A");
        }
    }
    #[test] fn octal_max() { ok(r#"\377""#, "\u{FF}"); }
    #[test] fn octal_not_terminated() { err(r"\12", ErrorKind::EscapeIncomplete); }
    #[test] fn octal_illegal() {
        err(r#"\128""#, ErrorKind::EscapeIllegal("bytes from '0' to '7'"));
    }
    #[test] fn octal_overflow() { err(r#"\777""#, ErrorKind::EscapeOverflow(255)); }
    #[test] fn hex_byte() { ok(r#"\xFF""#, "ÿ"); }
    #[test] fn hex_not_terminated() { err(r"\xF", ErrorKind::EscapeIncomplete); }
    #[test] fn hex_illegal() { err(r#"\xFX""#, ErrorKind::EscapeIllegal("hex bytes")); }
    #[test] fn wide_hex() {
        ok(r#"\uff00""#, "\u{FF00}");
        ok(r#"\U000000FF""#, "\u{FF}");
    }
    #[test] fn code_point_overflow() {
        err(r#"\UFFFFFFFF""#, ErrorKind::EscapeOverflow(0x10FFFF));
    }
    #[test] fn surrogate_is_invalid() { err(r#"\uD800""#, ErrorKind::InvalidRune); }
    #[test] fn unknown_escape() {
        err(r#"\kFF""#, ErrorKind::EscapeIdent);
        err(r#"\8""#, ErrorKind::EscapeIdent);
    }
    #[test] fn raw_whitespace_becomes_space() { ok("\t\r\n\"", "   "); }

    #[test]
    fn template_markers() {
        let mut bindings = Vec::new();
        let mut cur = Cursor::new(b"{hello} {{hello}\"");
        let s = decode(
            &mut cur,
            b'"',
            Mode::Quoted,
            Some(Templates { bindings: &mut bindings, target: "h" }),
        )
        .unwrap();
        assert_eq!(s, "{hello} {hello}");
        assert_eq!(bindings, vec![TemplateBinding::new("hello", "h", Slot::Interpolated)]);
    }

    #[test] fn template_at_end() { err("{", ErrorKind::StringNotTerminated); }
    #[test] fn template_with_space() { err("{ a}\"", ErrorKind::TemplateIdent); }

    #[test]
    fn template_outside_prefab() {
        let mut cur = Cursor::new(b"{h}\"");
        let e = decode(&mut cur, b'"', Mode::Quoted, None).unwrap_err();
        assert_eq!(e.kind, ErrorKind::TemplateOutside);
    }

    #[test]
    fn text_collapses_and_trims() {
        let mut cur = Cursor::new(b"a \\  b \t\n");
        let s = decode(&mut cur, b'<', Mode::Text, None).unwrap();
        assert_eq!(s, "a  b");
        let mut cur = Cursor::new(b"hello   big\n\n world  <next");
        let s = decode(&mut cur, b'<', Mode::Text, None).unwrap();
        assert_eq!(s, "hello big world");
        assert_eq!(cur.current(), Some(b'<'));
    }

    #[test]
    fn quoted_consumes_terminator() {
        let mut cur = Cursor::new(b"ab\"]");
        decode(&mut cur, b'"', Mode::Quoted, None).unwrap();
        assert_eq!(cur.current(), Some(b']'));
    }
}
