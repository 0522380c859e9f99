use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

// ── Value ─────────────────────────────────────────────────────────────────

/// A single value inside a style property list.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `10` or `10i`
    Int(i64),
    /// `1.5` or `10f`
    Float(f64),
    /// `10u`
    Uint(u64),
    /// `true` / `false`
    Bool(bool),
    /// Bare identifier or quoted string.
    Str(String),
    /// `{ ... }`
    Style(Style),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn is_inherit(&self) -> bool {
        self.as_str() == Some(INHERIT)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self { Value::Int(v) }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self { Value::Float(v) }
}
impl From<u64> for Value {
    fn from(v: u64) -> Self { Value::Uint(v) }
}
impl From<bool> for Value {
    fn from(v: bool) -> Self { Value::Bool(v) }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::Str(v.to_string()) }
}
impl From<String> for Value {
    fn from(v: String) -> Self { Value::Str(v) }
}
impl From<Style> for Value {
    fn from(v: Style) -> Self { Value::Style(v) }
}

/// Placeholder that [`Style::inherit`] replaces.
pub const INHERIT: &str = "inherit";

// ── Style ─────────────────────────────────────────────────────────────────

/// Property name → ordered list of values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style(HashMap<String, Vec<Value>>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    fn first(&self, key: &str) -> Option<&Value> {
        self.0.get(key)?.first()
    }

    /// First value of `key` if it is a string.
    pub fn ident(&self, key: &str) -> Option<&str> {
        self.first(key)?.as_str()
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.first(key)? {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        match self.first(key)? {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn uint(&self, key: &str) -> Option<u64> {
        match self.first(key)? {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.first(key)? {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn nested(&self, key: &str) -> Option<&Style> {
        match self.first(key)? {
            Value::Style(v) => Some(v),
            _ => None,
        }
    }

    /// Replaces `inherit` placeholders with the values `other` holds at the
    /// same position. A property that is exactly `[inherit]` takes the whole
    /// list from `other`. Properties `other` lacks are left as they are.
    pub fn inherit(&mut self, other: &Style) {
        for (key, values) in self.0.iter_mut() {
            let Some(source) = other.0.get(key) else {
                continue;
            };
            if source.is_empty() {
                continue;
            }
            if values.len() == 1 && values[0].is_inherit() {
                values.clone_from(source);
                continue;
            }
            for (value, fallback) in values.iter_mut().zip(source) {
                if value.is_inherit() {
                    value.clone_from(fallback);
                }
            }
        }
    }

    /// Copies every property of `self` into `other`, replacing same-named
    /// properties there.
    pub fn overwrite(&self, other: &mut Style) {
        for (key, values) in &self.0 {
            other.0.insert(key.clone(), values.clone());
        }
    }
}

impl Deref for Style {
    type Target = HashMap<String, Vec<Value>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Style {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<Value>)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, Vec<Value>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ── Styles ────────────────────────────────────────────────────────────────

/// Named styles of a whole style sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Styles(HashMap<String, Style>);

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `other` in. Styles present on both sides get `other`'s
    /// properties written over them; new names are inserted.
    pub fn add(&mut self, other: Styles) {
        for (name, style) in other.0 {
            match self.0.get_mut(&name) {
                Some(existing) => style.overwrite(existing),
                None => {
                    self.0.insert(name, style);
                }
            }
        }
    }
}

impl Deref for Styles {
    type Target = HashMap<String, Style>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Styles {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Into<String>> FromIterator<(K, Style)> for Styles {
    fn from_iter<I: IntoIterator<Item = (K, Style)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
