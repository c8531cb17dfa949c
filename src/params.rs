//! Filter inputs and compiled statements.
//!
//! [`Filters`] are compiled into inline literals; [`Parameters`] into
//! placeholders bound separately. Both keep the order they were built in.

use std::fmt;

use crate::value::Value;

/// Key/value filter compiled into inline SQL literals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(Vec<(String, Value)>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Add or replace an entry; a replaced entry keeps its position.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.0.push((field, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::new();
        for (field, value) in iter {
            filters.insert(field, value);
        }
        filters
    }
}

/// A named value. Inside [`Parameters`] the name is a bare field name; inside
/// a [`Statement`] it carries the dialect marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Typed parameter list compiled into placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(Vec<Parameter>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add(field, value);
        self
    }

    /// Add or replace a parameter; a replaced parameter keeps its position.
    pub fn add(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let param = Parameter::new(field, value);
        match self.0.iter_mut().find(|p| p.name == param.name) {
            Some(existing) => existing.value = param.value,
            None => self.0.push(param),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|p| p.name == field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.iter().find(|p| p.name == field).map(|p| &p.value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (field, value) in iter {
            params.add(field, value);
        }
        params
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// SQL text plus the ordered bindings it expects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Parameter>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.params.push(Parameter {
            name: name.into(),
            value,
        });
    }

    /// Append another fragment and its bindings.
    pub fn append(&mut self, other: Statement) {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
