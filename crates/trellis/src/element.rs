use std::collections::HashMap;

use crate::style::Style;

/// Attribute name → ordered list of values.
pub type Attributes = HashMap<String, Vec<String>>;

/// Name under which free text runs are stored, both as element name and as
/// the attribute holding the content.
pub const TEXT: &str = "text";

// ── Element ───────────────────────────────────────────────────────────────

/// A node of the parsed markup tree.
///
/// ```tml
/// <button onclick="save" class=["primary" "wide"]>Save</>
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Attributes,
    /// Parsed form of the style attribute, when style parsing is enabled.
    pub style: Option<Style>,
    pub children: Vec<Element>,
    /// Substitution points recorded while this element was part of a prefab
    /// definition.
    pub bindings: Vec<TemplateBinding>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// A free text node: `text` element with a single `text` attribute.
    pub fn text(content: impl Into<String>) -> Self {
        let mut el = Self::new(TEXT);
        el.attributes.insert(TEXT.to_string(), vec![content.into()]);
        el
    }

    pub fn is_text(&self) -> bool {
        self.name == TEXT
    }

    pub fn attribute(&self, key: &str) -> Option<&[String]> {
        self.attributes.get(key).map(Vec::as_slice)
    }

    /// First value of an attribute.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.attribute(key)?.first().map(String::as_str)
    }

    /// Produces a fresh copy of this prefab subtree with its bindings
    /// resolved against `supplied`.
    ///
    /// Parameters missing from `supplied` are skipped. The receiver is never
    /// modified, so one prefab can be instantiated any number of times.
    ///
    /// An interpolated binding replaces the first `{name}` in its target,
    /// which may be a literal written as `{{name}` earlier in the same value.
    pub fn instantiate(&self, supplied: &Attributes) -> Element {
        let children = self.children.iter().map(|c| c.instantiate(supplied)).collect();
        let mut attributes = self.attributes.clone();

        for binding in &self.bindings {
            let Some(values) = supplied.get(&binding.parameter) else {
                continue;
            };
            // Only whole-value bindings take more than the first value.
            match binding.slot {
                Slot::Whole => {
                    attributes.insert(binding.target.clone(), values.clone());
                }
                Slot::Interpolated => {
                    let (Some(value), Some(text)) = (
                        values.first(),
                        attributes.get_mut(&binding.target).and_then(|v| v.first_mut()),
                    ) else {
                        continue;
                    };
                    let marker = format!("{{{}}}", binding.parameter);
                    *text = text.replacen(&marker, value, 1);
                }
                Slot::Index(i) => {
                    let (Some(value), Some(slot)) = (
                        values.first(),
                        attributes.get_mut(&binding.target).and_then(|v| v.get_mut(i)),
                    ) else {
                        continue;
                    };
                    slot.clone_from(value);
                }
            }
        }

        Element {
            name: self.name.clone(),
            attributes,
            style: self.style.clone(),
            children,
            bindings: self.bindings.clone(),
        }
    }
}

// ── Template bindings ─────────────────────────────────────────────────────

/// Where a template parameter lands inside its target attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// `attr={name}`: the supplied list replaces the whole value.
    Whole,
    /// `attr="text {name}"`: `{name}` inside the first string is replaced.
    Interpolated,
    /// `attr=["a" {name}]`: one list position is overwritten.
    Index(usize),
}

/// A `{parameter}` recorded inside a prefab definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBinding {
    pub parameter: String,
    pub target: String,
    pub slot: Slot,
}

impl TemplateBinding {
    pub fn new(parameter: impl Into<String>, target: impl Into<String>, slot: Slot) -> Self {
        Self { parameter: parameter.into(), target: target.into(), slot }
    }
}
