use std::collections::{HashMap, HashSet};

use crate::cursor::Cursor;
use crate::decoder::{decode, Mode, Templates};
use crate::element::{Attributes, Element, Slot, TemplateBinding, TEXT};
use crate::error::{ErrorKind, Result};
use crate::style::parse_style_block;

const COMMENT: &[u8] = b"<#>";

// ── Config ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Re-parse the style attribute as a style block into [`Element::style`].
    pub parse_styles: bool,
    pub style_attribute: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { parse_styles: true, style_attribute: "style".to_string() }
    }
}

// ── Parser ────────────────────────────────────────────────────────────────

/// Markup parser.
///
/// The definition set and the prefab registry outlive a single parse; the
/// remaining fields are scratch state reset by every [`Parser::parse`] call.
/// A parser must not be shared between concurrent parses.
#[derive(Debug, Default)]
pub struct Parser {
    config: ParserConfig,
    definitions: HashSet<String>,
    prefabs: HashMap<String, Element>,

    root: Element,
    stack: Vec<Element>,
    /// Stack depth at which the prefab being defined sits.
    prefab_base: Option<usize>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    // ── Definitions ───────────────────────────────────────────────────────

    /// Accept `names` as valid element identifiers.
    pub fn add_definitions<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definitions.extend(names.into_iter().map(Into::into));
    }

    pub fn remove_definitions<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.definitions.remove(name.as_ref());
        }
    }

    pub fn clear_definitions(&mut self) {
        self.definitions.clear();
    }

    pub fn definitions(&self) -> &HashSet<String> {
        &self.definitions
    }

    // ── Prefabs ───────────────────────────────────────────────────────────

    /// Parse `src` only for the prefab definitions it contains.
    pub fn add_prefabs(&mut self, src: &[u8]) -> Result<()> {
        let doc = self.parse(src)?;
        if !doc.children.is_empty() {
            log::debug!(
                "add_prefabs: ignoring {} top-level elements outside prefab definitions",
                doc.children.len()
            );
        }
        Ok(())
    }

    pub fn remove_prefabs<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            if self.prefabs.remove(name.as_ref()).is_some() {
                log::debug!("removed prefab {:?}", name.as_ref());
            }
        }
    }

    pub fn clear_prefabs(&mut self) {
        self.prefabs.clear();
    }

    pub fn prefab(&self, name: &str) -> Option<&Element> {
        self.prefabs.get(name)
    }

    pub fn prefabs(&self) -> &HashMap<String, Element> {
        &self.prefabs
    }

    // ── Parsing ───────────────────────────────────────────────────────────

    /// Root built by the last parse that failed. Useful for diagnostics, but
    /// it is not a valid document.
    pub fn partial(&self) -> &Element {
        &self.root
    }

    fn restart(&mut self) {
        self.root = Element::default();
        self.stack.clear();
        self.prefab_base = None;
    }

    /// Parse a document. The returned root is an unnamed element whose
    /// children are the top-level nodes.
    pub fn parse(&mut self, src: &[u8]) -> Result<Element> {
        self.restart();
        log::debug!("parsing {} bytes", src.len());

        let mut cur = Cursor::new(src);
        self.document(&mut cur)?;
        if !self.stack.is_empty() {
            return Err(cur.error(ErrorKind::MissingClosure));
        }

        let root = std::mem::take(&mut self.root);
        log::debug!("parsed {} top-level elements", root.children.len());
        Ok(root)
    }

    fn document(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        while let Some(b) = cur.skip_whitespace() {
            match b {
                b'<' => self.tag(cur)?,
                _ => self.text(cur)?,
            }
        }
        Ok(())
    }

    /// Cursor on `<`.
    fn tag(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        match cur.advance_or(ErrorKind::Incomplete)? {
            b'/' => self.close(cur, false),
            b'#' => self.comment(cur),
            b'!' => {
                if cur.advance_or(ErrorKind::Incomplete)? == b'/' {
                    return self.close(cur, true);
                }
                if self.prefab_base.is_some() {
                    return Err(cur.error(ErrorKind::NestedPrefab));
                }
                self.prefab_base = Some(self.stack.len());
                self.element(cur, true)
            }
            _ => self.element(cur, false),
        }
    }

    /// Cursor on `#` of `<#>`.
    fn comment(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        cur.backtrack();
        if !cur.check_literal(COMMENT) {
            cur.set(cur.pos() + 2);
            return Err(cur.error(ErrorKind::CommentAfterHash));
        }
        cur.set(cur.pos() + COMMENT.len());
        if !cur.skip_past(COMMENT) {
            cur.set(cur.source().len());
            return Err(cur.error(ErrorKind::CommentNotClosed));
        }
        Ok(())
    }

    /// Cursor on the `/` of `</>` or `<!/>`.
    fn close(&mut self, cur: &mut Cursor<'_>, prefab_marker: bool) -> Result<()> {
        cur.expect(b'>', ErrorKind::AfterSlash)?;
        if self.stack.is_empty() {
            return Err(cur.error(ErrorKind::ExtraClosure));
        }

        let closes_prefab = self.prefab_base == Some(self.stack.len() - 1);
        if prefab_marker && !closes_prefab {
            return Err(cur.error(ErrorKind::PrefabClosure));
        }

        let Some(el) = self.stack.pop() else {
            return Err(cur.error(ErrorKind::ExtraClosure));
        };
        log::trace!("closed <{}>", el.name);
        if closes_prefab {
            self.prefab_base = None;
            log::debug!("registered prefab {:?}", el.name);
            self.prefabs.insert(el.name.clone(), el);
        } else {
            self.add(el);
        }
        cur.advance();
        Ok(())
    }

    /// Free text run; cursor on its first visible byte.
    fn text(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        let mut el = Element::new(TEXT);
        let sink = self
            .in_prefab()
            .then(|| Templates { bindings: &mut el.bindings, target: TEXT });
        let content = decode(cur, b'<', Mode::Text, sink)?;
        el.attributes.insert(TEXT.to_string(), vec![content]);
        self.add(el);
        Ok(())
    }

    /// Opening tag; cursor on the first identifier byte.
    fn element(&mut self, cur: &mut Cursor<'_>, is_prefab: bool) -> Result<()> {
        let name = cur.read_identifier();
        if name.is_empty() {
            return Err(cur.error(ErrorKind::Identifier));
        }

        let is_instance = self.prefabs.contains_key(name);
        if self.in_prefab() {
            let defined = is_prefab && self.definitions.contains(name);
            if is_instance || defined {
                return Err(cur.error(ErrorKind::PrefabShadow(name.to_string())));
            }
        } else if !is_instance && !self.definitions.contains(name) {
            return Err(cur.error(ErrorKind::Unknown(name.to_string())));
        }

        let mut el = Element::new(name);
        loop {
            match cur.current() {
                Some(b' ') => {
                    if is_prefab {
                        return Err(cur.error(ErrorKind::PrefabAttributes));
                    }
                    if matches!(cur.advance(), Some(b' ' | b'/' | b'>')) {
                        continue;
                    }
                    self.attribute(cur, &mut el)?;
                }
                Some(b'/') => {
                    cur.expect(b'>', ErrorKind::AfterSlash)?;
                    cur.advance();
                    if is_prefab {
                        self.prefab_base = None;
                        log::debug!("registered empty prefab {:?}", el.name);
                        self.prefabs.insert(el.name.clone(), el);
                    } else if is_instance {
                        let instance = self.instantiate(name, &el.attributes, cur)?;
                        for child in instance.children {
                            self.add(child);
                        }
                    } else {
                        self.add(el);
                    }
                    return Ok(());
                }
                Some(b'>') => {
                    cur.advance();
                    log::trace!("opened <{}>", el.name);
                    self.stack.push(el);
                    return Ok(());
                }
                Some(_) => return Err(cur.error(ErrorKind::AfterIdent)),
                None => return Err(cur.error(ErrorKind::Incomplete)),
            }
        }
    }

    /// One `name`, `name="v"`, `name=[..]` or `name={param}`; cursor on the
    /// first byte of the name.
    fn attribute(&mut self, cur: &mut Cursor<'_>, el: &mut Element) -> Result<()> {
        let name = cur.read_identifier();
        if name.is_empty() {
            return Err(cur.error(ErrorKind::Assignment));
        }

        match cur.current() {
            Some(b'=') => self.value(cur, el, name)?,
            Some(b' ') => el.attributes.entry(name.to_string()).or_default().push("true".to_string()),
            Some(_) => return Err(cur.error(ErrorKind::Assignment)),
            None => return Err(cur.error(ErrorKind::AttribIncomplete)),
        }

        // interpolated styles are parsed per instance, after substitution
        if self.config.parse_styles
            && name == self.config.style_attribute
            && !el.bindings.iter().any(|b| b.target == name)
        {
            self.attach_style(cur, el)?;
        }
        Ok(())
    }

    /// Cursor on `=`.
    fn value(&mut self, cur: &mut Cursor<'_>, el: &mut Element, name: &str) -> Result<()> {
        match cur.advance_or(ErrorKind::AttribIncomplete)? {
            b'"' => {
                cur.advance();
                let in_prefab = self.in_prefab();
                let sink = in_prefab.then(|| Templates { bindings: &mut el.bindings, target: name });
                let s = decode(cur, b'"', Mode::Quoted, sink)?;
                el.attributes.entry(name.to_string()).or_default().push(s);
                Ok(())
            }
            b'{' => {
                let param = self.template(cur)?;
                el.bindings.push(TemplateBinding::new(param, name, Slot::Whole));
                Ok(())
            }
            b'[' => self.list(cur, el, name),
            _ => Err(cur.error(ErrorKind::ValueStart)),
        }
    }

    /// Cursor on `[`; ends after `]`.
    fn list(&mut self, cur: &mut Cursor<'_>, el: &mut Element, name: &str) -> Result<()> {
        let mut list = el.attributes.remove(name).unwrap_or_default();
        let mut opening = true;
        loop {
            match cur.current() {
                Some(b' ' | b'[') => {
                    match cur.advance_or(ErrorKind::ListIncomplete)? {
                        b' ' => return Err(cur.error(ErrorKind::ExtraSpace)),
                        b']' if opening => continue,
                        b'"' => {
                            cur.advance();
                            let sink = self
                                .in_prefab()
                                .then(|| Templates { bindings: &mut el.bindings, target: name });
                            list.push(decode(cur, b'"', Mode::Quoted, sink)?);
                        }
                        b'{' => {
                            let param = self.template(cur)?;
                            el.bindings.push(TemplateBinding::new(param, name, Slot::Index(list.len())));
                            list.push(String::new());
                        }
                        _ => return Err(cur.error(ErrorKind::BetweenByte)),
                    }
                    opening = false;
                }
                Some(b']') => {
                    cur.advance();
                    el.attributes.insert(name.to_string(), list);
                    return Ok(());
                }
                Some(_) => return Err(cur.error(ErrorKind::BetweenByte)),
                None => return Err(cur.error(ErrorKind::ListIncomplete)),
            }
        }
    }

    /// `{param}` as an attribute value or list item; cursor on `{`, ends after `}`.
    fn template(&self, cur: &mut Cursor<'_>) -> Result<String> {
        if !self.in_prefab() {
            return Err(cur.error(ErrorKind::TemplateOutside));
        }
        cur.advance_or(ErrorKind::AttribIncomplete)?;
        let param = cur.read_identifier();
        if param.is_empty() || cur.current() != Some(b'}') {
            return Err(cur.error(ErrorKind::TemplateIdent));
        }
        cur.advance();
        Ok(param.to_string())
    }

    // ── Styles ────────────────────────────────────────────────────────────

    fn attach_style(&self, cur: &Cursor<'_>, el: &mut Element) -> Result<()> {
        let Some(source) = el.first(&self.config.style_attribute) else {
            return Ok(());
        };
        let style = parse_style_block(source.as_bytes())
            .map_err(|e| cur.error(ErrorKind::Style(Box::new(e))))?;
        el.style = Some(style);
        Ok(())
    }

    /// Instantiate a registered prefab and parse the styles its bindings
    /// filled in. A style with an unsupplied parameter stays unparsed.
    fn instantiate(&self, name: &str, supplied: &Attributes, cur: &Cursor<'_>) -> Result<Element> {
        let Some(prefab) = self.prefabs.get(name) else {
            return Err(cur.error(ErrorKind::Unknown(name.to_string())));
        };
        let mut instance = prefab.instantiate(supplied);
        if self.config.parse_styles {
            let key = &self.config.style_attribute;
            let mut pending: Vec<&mut Element> = vec![&mut instance];
            while let Some(el) = pending.pop() {
                let mut style_bindings = el.bindings.iter().filter(|b| &b.target == key).peekable();
                let bound = style_bindings.peek().is_some();
                let resolved = style_bindings.all(|b| supplied.contains_key(&b.parameter));
                if bound && resolved {
                    self.attach_style(cur, el)?;
                }
                pending.extend(el.children.iter_mut());
            }
        }
        Ok(instance)
    }

    // ── Tree ──────────────────────────────────────────────────────────────

    fn in_prefab(&self) -> bool {
        self.prefab_base.is_some()
    }

    /// Attach to the innermost open element, or to the root.
    fn add(&mut self, el: Element) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(el),
            None => self.root.children.push(el),
        }
    }
}

// ── Public parse entry point ──────────────────────────────────────────────

/// Parse a document accepting exactly `definitions` as element names.
pub fn parse_str<I, S>(src: &str, definitions: I) -> Result<Element>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut parser = Parser::new();
    parser.add_definitions(definitions);
    parser.parse(src.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Value;

    fn parser() -> Parser {
        let mut p = Parser::new();
        p.add_definitions(["div", "fiv", "giv", "button"]);
        p
    }

    fn ok(src: &str) -> Element {
        parser().parse(src.as_bytes()).unwrap()
    }

    fn err(src: &str) -> ErrorKind {
        parser().parse(src.as_bytes()).unwrap_err().kind
    }

    fn names(el: &Element) -> Vec<&str> {
        el.children.iter().map(|c| c.name.as_str()).collect()
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    // ── Structure ─────────────────────────────────────────────────────────

    #[test]
    fn nesting_follows_tags() {
        let root = ok("<div><fiv/><giv/></>");
        assert_eq!(names(&root), ["div"]);
        assert_eq!(names(&root.children[0]), ["fiv", "giv"]);
    }

    #[test]
    fn comments_text_and_nesting() {
        let root = ok("
            <#>comment<#>
            <div>
                <fiv>
                    <giv/>
                    hello
                    <giv/>
                </>
            </>
        ");
        let fiv = &root.children[0].children[0];
        assert_eq!(names(fiv), ["giv", "text", "giv"]);
        assert_eq!(fiv.children[1].first("text"), Some("hello"));
    }

    #[test]
    fn text_only_document() {
        let root = ok("hello   there\n  world ");
        assert_eq!(root.children, vec![Element::text("hello there world")]);
    }

    #[test]
    fn comment_body_is_opaque() {
        let root = ok("<#> <div> < # <#><div/>");
        assert_eq!(names(&root), ["div"]);
    }

    #[test] fn incomplete() { assert_eq!(err("<"), ErrorKind::Incomplete); }
    #[test] fn comment_after_hash() { assert_eq!(err("<#"), ErrorKind::CommentAfterHash); }
    #[test] fn comment_not_closed() { assert_eq!(err("<#>asd"), ErrorKind::CommentNotClosed); }
    #[test] fn after_slash() { assert_eq!(err("<div></"), ErrorKind::AfterSlash); }
    #[test] fn invalid_end() { assert_eq!(err("<div/ >"), ErrorKind::AfterSlash); }
    #[test] fn missing_closure() { assert_eq!(err("<div>"), ErrorKind::MissingClosure); }
    #[test] fn extra_closure() { assert_eq!(err("<div></></>"), ErrorKind::ExtraClosure); }
    #[test] fn missing_identifier() { assert_eq!(err("< div/>"), ErrorKind::Identifier); }
    #[test] fn after_identifier() { assert_eq!(err("<div=/>"), ErrorKind::AfterIdent); }
    #[test] fn unterminated_tag() { assert_eq!(err("<div"), ErrorKind::Incomplete); }

    #[test]
    fn unknown_identifier() {
        let mut p = Parser::new();
        p.add_definitions(["div", "riv"]);
        p.remove_definitions(["riv"]);
        let e = p.parse(b"<div/><riv/>").unwrap_err();
        assert_eq!(e.kind, ErrorKind::Unknown("riv".into()));
        assert_eq!(names(p.partial()), ["div"]);

        p.clear_definitions();
        assert!(matches!(p.parse(b"<div/>").unwrap_err().kind, ErrorKind::Unknown(_)));
    }

    #[test]
    fn missing_closure_reported_at_end() {
        let e = parser().parse(b"<div>\n<fiv/>\n").unwrap_err();
        assert_eq!(e.kind, ErrorKind::MissingClosure);
        assert_eq!(e.line, 3);
    }

    #[test]
    fn parser_is_reusable_after_error() {
        let mut p = parser();
        assert!(p.parse(b"<div>").is_err());
        let root = p.parse(b"<div/>").unwrap();
        assert_eq!(names(&root), ["div"]);
    }

    // ── Attributes ────────────────────────────────────────────────────────

    #[test]
    fn attributes() {
        let root = ok(r#"<div hello="hello" krr=["asd" "asd"] flag />"#);
        let div = &root.children[0];
        assert_eq!(div.attribute("hello"), Some(&strings(&["hello"])[..]));
        assert_eq!(div.attribute("krr"), Some(&strings(&["asd", "asd"])[..]));
        assert_eq!(div.first("flag"), Some("true"));
    }

    #[test]
    fn long_list_and_empty_list() {
        let root = ok(r#"<div l=["hello" "fl" "gg" "mm"] e=[]/>"#);
        let div = &root.children[0];
        assert_eq!(div.attribute("l"), Some(&strings(&["hello", "fl", "gg", "mm"])[..]));
        assert_eq!(div.attribute("e"), Some(&[][..]));
    }

    #[test] fn assignment() { assert_eq!(err(r#"<div h,"f"/>"#), ErrorKind::Assignment); }
    #[test] fn flag_before_slash() { assert_eq!(err("<div hello/>"), ErrorKind::Assignment); }
    #[test] fn value_incomplete() { assert_eq!(err("<div hello="), ErrorKind::AttribIncomplete); }
    #[test] fn value_start() { assert_eq!(err("<div hello= />"), ErrorKind::ValueStart); }
    #[test] fn extra_space() { assert_eq!(err("<div hello=[ ]/>"), ErrorKind::ExtraSpace); }
    #[test] fn list_incomplete() { assert_eq!(err("<div hello=["), ErrorKind::ListIncomplete); }
    #[test] fn between_byte() { assert_eq!(err("<div hello=[x]/>"), ErrorKind::BetweenByte); }
    #[test] fn between_byte_after_value() {
        assert_eq!(err(r#"<div hello=[""x]/>"#), ErrorKind::BetweenByte);
    }
    #[test] fn bad_escape_in_value() {
        assert_eq!(err(r#"<div hello="br\xfk"/>"#), ErrorKind::EscapeIllegal("hex bytes"));
    }
    #[test] fn template_outside_list() {
        assert_eq!(err("<div hello=[{hello}]/>"), ErrorKind::TemplateOutside);
    }
    #[test] fn template_outside_value() { assert_eq!(err("<div h={h}/>"), ErrorKind::TemplateOutside); }
    #[test] fn template_outside_text() { assert_eq!(err("{h}"), ErrorKind::TemplateOutside); }

    // ── Styles ────────────────────────────────────────────────────────────

    #[test]
    fn style_attribute_is_parsed() {
        let root = ok(r#"<div style="a: f;k: 10;h: 10f;"/>"#);
        let div = &root.children[0];
        let style = div.style.as_ref().unwrap();
        assert_eq!(style.ident("a"), Some("f"));
        assert_eq!(style.int("k"), Some(10));
        assert_eq!(style.float("h"), Some(10.0));
        assert_eq!(div.first("style"), Some("a: f;k: 10;h: 10f;"));
    }

    #[test]
    fn style_errors_are_wrapped() {
        let e = parser().parse(br#"<div style="a: ;"/>"#).unwrap_err();
        let ErrorKind::Style(inner) = e.kind else {
            panic!("expected style error, got {:?}", e.kind);
        };
        assert_eq!(inner.kind, ErrorKind::NoValues("a".into()));
    }

    #[test]
    fn style_parsing_can_be_disabled() {
        let mut p = Parser::with_config(ParserConfig { parse_styles: false, ..Default::default() });
        p.add_definitions(["div"]);
        let root = p.parse(br#"<div style="not a style"/>"#).unwrap();
        assert_eq!(root.children[0].style, None);
    }

    // ── Prefabs ───────────────────────────────────────────────────────────

    fn prefab_output(src: &str) -> Vec<Element> {
        let mut p = parser();
        p.parse(src.as_bytes()).unwrap().children
    }

    #[test]
    fn simple_prefab() {
        let out = prefab_output("
            <!h>
                <div/>
            <!/>
            <h/>
        ");
        assert_eq!(out, vec![Element::new("div")]);
    }

    #[test]
    fn whole_value_template() {
        let out = prefab_output(r#"<!h><div h={h}/><!/><h h="h"/>"#);
        assert_eq!(out[0].attribute("h"), Some(&strings(&["h"])[..]));
        assert_eq!(out[0].bindings, vec![TemplateBinding::new("h", "h", Slot::Whole)]);
    }

    #[test]
    fn list_templates() {
        let out = prefab_output(r#"<!h><div h=[{h} {k} {j}]/><!/><h h="h" k="k"/>"#);
        assert_eq!(out[0].attribute("h"), Some(&strings(&["h", "k", ""])[..]));
        assert_eq!(
            out[0].bindings,
            vec![
                TemplateBinding::new("h", "h", Slot::Index(0)),
                TemplateBinding::new("k", "h", Slot::Index(1)),
                TemplateBinding::new("j", "h", Slot::Index(2)),
            ]
        );
    }

    #[test]
    fn string_template() {
        let out = prefab_output(r#"<!h><div h="hello {there}"/><!/><h there="meme"/>"#);
        assert_eq!(out[0].first("h"), Some("hello meme"));
    }

    #[test]
    fn text_template() {
        let out = prefab_output(r#"<!h> {there} <!/><h there="meme"/>"#);
        assert_eq!(out[0].first(TEXT), Some("meme"));
        assert_eq!(out[0].bindings, vec![TemplateBinding::new("there", TEXT, Slot::Interpolated)]);
    }

    #[test]
    fn showcase() {
        let mut p = parser();
        let root = p
            .parse(br#"
<#>prefab definition<#>
<!yes_no>
    <div>
        <button onclick={yes}>yes</>
        <button onclick={no}>no</>
    </>
<!/>

<div>Hello, is monday today?</>
<yes_no yes="yes-handler-link" no="no-handler-link"/>
"#)
            .unwrap();
        assert_eq!(names(&root), ["div", "div"]);
        let buttons = &root.children[1].children;
        assert_eq!(buttons[0].first("onclick"), Some("yes-handler-link"));
        assert_eq!(buttons[1].first("onclick"), Some("no-handler-link"));
        assert_eq!(buttons[1].children[0].first(TEXT), Some("no"));
        assert!(p.prefab("yes_no").is_some());
    }

    #[test]
    fn instances_are_independent() {
        let mut p = parser();
        p.add_prefabs(br#"<!card><div t="{title}" l=["x" {item}]/><!/>"#).unwrap();
        let a = p.parse(br#"<card title="A" item="1"/>"#).unwrap();
        let b = p.parse(br#"<card title="B"/>"#).unwrap();
        let c = p.parse(b"<card/>").unwrap();
        assert_eq!(a.children[0].first("t"), Some("A"));
        assert_eq!(a.children[0].attribute("l"), Some(&strings(&["x", "1"])[..]));
        assert_eq!(b.children[0].first("t"), Some("B"));
        assert_eq!(b.children[0].attribute("l"), Some(&strings(&["x", ""])[..]));
        assert_eq!(c.children[0].first("t"), Some("{title}"));
        assert_eq!(p.prefab("card").unwrap().children[0].first("t"), Some("{title}"));
    }

    #[test]
    fn prefab_definition_registry() {
        let mut p = parser();
        p.add_prefabs(b"<!ff><!/>").unwrap();
        assert_eq!(p.prefab("ff"), Some(&Element::new("ff")));
        p.remove_prefabs(["ff"]);
        assert!(p.prefab("ff").is_none());

        p.add_prefabs(br#"
<!prefab>
    <div hello={mel} ffl=["gl" {ghl}]/>
<!/>
        "#)
        .unwrap();
        let div = &p.prefab("prefab").unwrap().children[0];
        assert_eq!(div.attribute("ffl"), Some(&strings(&["gl", ""])[..]));
        assert!(div.attribute("hello").is_none());
        assert_eq!(
            div.bindings,
            vec![
                TemplateBinding::new("mel", "hello", Slot::Whole),
                TemplateBinding::new("ghl", "ffl", Slot::Index(1)),
            ]
        );

        p.clear_prefabs();
        assert!(p.prefabs().is_empty());
    }

    #[test]
    fn self_closing_prefab_definition() {
        let mut p = parser();
        let root = p.parse(b"<!empty/><div/>").unwrap();
        assert_eq!(names(&root), ["div"]);
        assert_eq!(p.prefab("empty"), Some(&Element::new("empty")));
    }

    #[test]
    fn prefab_closed_by_plain_closure() {
        let mut p = parser();
        p.add_prefabs(b"<!row><div></></>").unwrap();
        assert_eq!(names(p.prefab("row").unwrap()), ["div"]);
    }

    #[test] fn prefab_ident() { assert_eq!(err("<!prefab><div h={}/><!/>"), ErrorKind::TemplateIdent); }
    #[test] fn prefab_ident_space() { assert_eq!(err("<!p><div h={a b}/><!/>"), ErrorKind::TemplateIdent); }
    #[test] fn prefab_incomplete() { assert_eq!(err("<!prefab><div h={"), ErrorKind::AttribIncomplete); }
    #[test] fn prefab_list_incomplete() { assert_eq!(err("<!prefab><div h=[{"), ErrorKind::AttribIncomplete); }
    #[test] fn prefab_attributes() { assert_eq!(err(r#"<!prefab h="h">"#), ErrorKind::PrefabAttributes); }
    #[test] fn prefab_marker_incomplete() { assert_eq!(err("<!"), ErrorKind::Incomplete); }
    #[test] fn prefab_extra_closure() { assert_eq!(err("<!/>"), ErrorKind::ExtraClosure); }
    #[test] fn prefab_nested() { assert_eq!(err("<!a><!b><!/><!/>"), ErrorKind::NestedPrefab); }
    #[test] fn prefab_inner_open() { assert_eq!(err("<!a><div><!/>"), ErrorKind::PrefabClosure); }
    #[test] fn prefab_unclosed() { assert_eq!(err("<!a><div/>"), ErrorKind::MissingClosure); }

    #[test]
    fn prefab_shadowing() {
        assert_eq!(err("<!prefab><!/><!prefab><!/>"), ErrorKind::PrefabShadow("prefab".into()));
        assert_eq!(err("<!div><!/>"), ErrorKind::PrefabShadow("div".into()));
        assert_eq!(err("<!a><!/><!b><a/><!/>"), ErrorKind::PrefabShadow("a".into()));
    }

    #[test]
    fn interpolated_style_parsed_per_instance() {
        let mut p = parser();
        p.add_prefabs(br#"<!tint><div style="color: {c};"/><!/>"#).unwrap();
        assert_eq!(p.prefab("tint").unwrap().children[0].style, None);

        let root = p.parse(br#"<tint c="red"/>"#).unwrap();
        let style = root.children[0].style.as_ref().unwrap();
        assert_eq!(style["color"], vec![Value::from("red")]);

        assert!(matches!(
            p.parse(br#"<tint c=""/>"#).unwrap_err().kind,
            ErrorKind::Style(_)
        ));
    }

    #[test]
    fn unsupplied_style_parameter_leaves_style_unparsed() {
        let mut p = parser();
        p.add_prefabs(br#"<!tint><div style="color: {c}; pad: {p};"/><!/>"#).unwrap();

        let root = p.parse(b"<tint/>").unwrap();
        assert_eq!(root.children[0].style, None);
        assert_eq!(root.children[0].first("style"), Some("color: {c}; pad: {p};"));

        let root = p.parse(br#"<tint c="red"/>"#).unwrap();
        assert_eq!(root.children[0].style, None);

        let root = p.parse(br#"<tint c="red" p="4"/>"#).unwrap();
        assert_eq!(root.children[0].style.as_ref().unwrap().int("pad"), Some(4));
    }

    #[test]
    fn parse_str_entry_point() {
        let root = parse_str("<a><b/></>", ["a", "b"]).unwrap();
        assert_eq!(names(&root.children[0]), ["b"]);
    }
}
