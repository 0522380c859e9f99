//! What the server knows about a document: the prefabs it defines, the
//! parameters each prefab takes, and documentation for built-in names.

use std::collections::BTreeSet;

use trellis::{Element, Slot};

// ── Built-ins ─────────────────────────────────────────────────────────────────

pub struct Builtin {
    pub name: &'static str,
    pub doc: &'static str,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: trellis::TEXT,
        doc: "Free text between tags. Whitespace runs collapse to one space and \
              trailing whitespace is trimmed.",
    },
    Builtin {
        name: "style",
        doc: "Inline style block, e.g. `style=\"color: red; pad: 4 4;\"`. \
              Parsed into the element's style unless style parsing is disabled.",
    },
    Builtin {
        name: trellis::style::INHERIT,
        doc: "Style placeholder replaced by the parent style's value at the same position.",
    },
];

pub fn builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

// ── Prefabs ───────────────────────────────────────────────────────────────────

/// Summary of a registered prefab, detached from the parser that built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefabInfo {
    pub name: String,
    /// Template parameters in first-use order.
    pub parameters: Vec<String>,
    /// Top-level element names of the prefab body.
    pub body: Vec<String>,
    /// One line per binding: where each parameter lands.
    pub usage: Vec<String>,
}

impl PrefabInfo {
    pub fn new(root: &Element) -> Self {
        let mut seen = BTreeSet::new();
        let mut parameters = Vec::new();
        let mut usage = Vec::new();
        let mut pending = vec![root];
        while let Some(el) = pending.pop() {
            for binding in &el.bindings {
                if seen.insert(binding.parameter.as_str()) {
                    parameters.push(binding.parameter.clone());
                }
                usage.push(format!(
                    "`{}` → `{}.{}` ({})",
                    binding.parameter,
                    el.name,
                    binding.target,
                    slot_doc(binding.slot)
                ));
            }
            pending.extend(el.children.iter().rev());
        }

        Self {
            name: root.name.clone(),
            parameters,
            body: root.children.iter().map(|c| c.name.clone()).collect(),
            usage,
        }
    }

    /// Markdown shown on hover.
    pub fn doc(&self) -> String {
        let mut md = format!("**{}** · prefab", self.name);
        if !self.body.is_empty() {
            md.push_str(&format!("\n\nExpands to `{}`", self.body.join("`, `")));
        }
        if !self.usage.is_empty() {
            md.push_str("\n\nParameters:");
            for line in &self.usage {
                md.push_str(&format!("\n- {line}"));
            }
        }
        md
    }

    /// Snippet inserting an instance with every parameter.
    pub fn snippet(&self) -> String {
        let mut s = self.name.clone();
        for (i, p) in self.parameters.iter().enumerate() {
            s.push_str(&format!(" {p}=\"${}\"", i + 1));
        }
        s.push_str("/>");
        s
    }
}

/// How a binding's slot reads in hover text.
fn slot_doc(slot: Slot) -> String {
    match slot {
        Slot::Whole => "whole value".to_string(),
        Slot::Interpolated => "inside string".to_string(),
        Slot::Index(i) => format!("list item {i}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis::Parser;

    fn prefab(src: &str, name: &str) -> PrefabInfo {
        let mut p = Parser::new();
        p.add_definitions(["div", "button"]);
        p.add_prefabs(src.as_bytes()).unwrap();
        PrefabInfo::new(p.prefab(name).unwrap())
    }

    #[test]
    fn parameters_in_first_use_order() {
        let info = prefab(
            r#"<!pair><div a={x} b="{y} {x}"/><button l=["" {z}]/><!/>"#,
            "pair",
        );
        assert_eq!(info.parameters, ["x", "y", "z"]);
        assert_eq!(info.body, ["div", "button"]);
    }

    #[test]
    fn snippet_lists_parameters() {
        let info = prefab("<!ok><button onclick={go}>ok</><!/>", "ok");
        assert_eq!(info.snippet(), r#"ok go="$1"/>"#);
        assert!(info.doc().contains("- `go` → `button.onclick` (whole value)"));
    }

    #[test]
    fn builtins_are_found() {
        assert!(builtin("style").is_some());
        assert!(builtin("nope").is_none());
    }

    #[test]
    fn slot_docs() {
        assert_eq!(slot_doc(Slot::Index(2)), "list item 2");
    }
}
