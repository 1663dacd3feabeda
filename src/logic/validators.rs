//! Declarative validation of data dictionaries.
//!
//! A [`Schema`] maps field names to a [`FieldType`] plus optional [`Node`]
//! settings (a default for missing values, extra validators). [`validate`]
//! deserializes a [`DataDict`] against it:
//!
//! ```ignore
//! let schema = Schema::new()
//!     .field("code", FieldType::Str, [])
//!     .field("website_url", FieldType::Str, [node::optional(None), node::validator(url())]);
//! let (data, errors) = validate(&schema, &input);
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::ErrorDict;
use crate::types::{Choice, Guid};
use crate::value::{DataDict, FieldValue};

pub const REQUIRED: &str = "Required";

/// A deserialized, type-checked field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cleaned {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Uuid(Guid),
    /// Integer value of a choice enumeration.
    Choice(i32),
}

impl fmt::Display for Cleaned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cleaned::Null => f.write_str("None"),
            Cleaned::Str(s) => write!(f, "{:?}", s),
            Cleaned::Int(i) => write!(f, "{}", i),
            Cleaned::Float(x) => write!(f, "{}", x),
            Cleaned::Bool(b) => write!(f, "{}", b),
            Cleaned::Date(d) => write!(f, "{}", d),
            Cleaned::Uuid(u) => write!(f, "{}", u),
            Cleaned::Choice(v) => write!(f, "{}", v),
        }
    }
}

/// Name and `(name, value)` pairs of a choice enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSpec {
    pub name: &'static str,
    pub pairs: Vec<(&'static str, i32)>,
}

impl EnumSpec {
    pub fn of<E: Choice>() -> Self {
        Self {
            name: E::TYPE_NAME,
            pairs: E::pairs(),
        }
    }

    fn value_of(&self, name: &str) -> Option<i32> {
        self.pairs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    fn has_value(&self, value: i64) -> bool {
        self.pairs.iter().any(|(_, v)| i64::from(*v) == value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Str,
    Int,
    Float,
    Bool,
    Date,
    Uuid,
    Enum(EnumSpec),
}

impl FieldType {
    pub fn enumeration<E: Choice>() -> Self {
        FieldType::Enum(EnumSpec::of::<E>())
    }

    /// Convert a present, non-empty raw value.
    fn deserialize(&self, value: &FieldValue) -> Result<Cleaned, String> {
        match self {
            FieldType::Str => match value {
                FieldValue::String(s) => Ok(Cleaned::Str(s.clone())),
                FieldValue::Int(_) | FieldValue::Float(_) => Ok(Cleaned::Str(value.to_string())),
                other => Err(format!("{} is not a string", other)),
            },
            FieldType::Int => match value {
                FieldValue::Int(i) => Ok(Cleaned::Int(*i)),
                FieldValue::Float(x) if x.fract() == 0.0 => Ok(Cleaned::Int(*x as i64)),
                FieldValue::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Cleaned::Int)
                    .map_err(|_| format!("\"{}\" is not a number", s)),
                other => Err(format!("\"{}\" is not a number", other)),
            },
            FieldType::Float => match value {
                FieldValue::Int(i) => Ok(Cleaned::Float(*i as f64)),
                FieldValue::Float(x) => Ok(Cleaned::Float(*x)),
                FieldValue::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Cleaned::Float)
                    .map_err(|_| format!("\"{}\" is not a number", s)),
                other => Err(format!("\"{}\" is not a number", other)),
            },
            FieldType::Bool => match value {
                FieldValue::Bool(b) => Ok(Cleaned::Bool(*b)),
                FieldValue::Int(i) => Ok(Cleaned::Bool(*i != 0)),
                FieldValue::String(s) => match s.trim().to_lowercase().as_str() {
                    "true" | "t" | "yes" | "y" | "on" | "1" => Ok(Cleaned::Bool(true)),
                    "false" | "f" | "no" | "n" | "off" | "0" => Ok(Cleaned::Bool(false)),
                    _ => Err(format!("\"{}\" is neither true nor false", s)),
                },
                other => Err(format!("\"{}\" is neither true nor false", other)),
            },
            FieldType::Date => match value {
                FieldValue::String(s) => parse_date(s)
                    .map(Cleaned::Date)
                    .ok_or_else(|| "Invalid date".to_string()),
                _ => Err("Invalid date".to_string()),
            },
            FieldType::Uuid => match value {
                FieldValue::String(s) => Guid::parse(s)
                    .map(Cleaned::Uuid)
                    .map_err(|_| format!("\"{}\" is not a valid UUID", s)),
                other => Err(format!("{} is not a string", other)),
            },
            FieldType::Enum(spec) => match value {
                FieldValue::String(s) => spec
                    .value_of(s.trim())
                    .map(Cleaned::Choice)
                    .ok_or_else(|| format!("'{}' is not a valid {}", s, spec.name)),
                FieldValue::Int(i) if spec.has_value(*i) => Ok(Cleaned::Choice(*i as i32)),
                other => Err(format!("{} is not a valid value for {}", other, spec.name)),
            },
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(|dt| dt.date())
    })
}

/// A check run on a successfully deserialized value.
pub type Validator = Arc<dyn Fn(&Cleaned) -> Result<(), String> + Send + Sync>;

/// A setting applied to a field when the schema is built.
#[derive(Clone)]
pub enum Node {
    /// Value used when the field is absent. Its presence makes the field
    /// optional.
    Missing(Cleaned),
    Validator(Validator),
}

pub mod node {
    use super::{Cleaned, Node, Validator};

    /// Mark a field optional, using `default` (or null) when it is absent.
    pub fn optional(default: Option<Cleaned>) -> Node {
        Node::Missing(default.unwrap_or(Cleaned::Null))
    }

    pub fn validator(validator: Validator) -> Node {
        Node::Validator(validator)
    }
}

#[derive(Clone)]
pub struct FieldSpec {
    pub kind: FieldType,
    pub missing: Option<Cleaned>,
    pub validators: Vec<Validator>,
}

impl FieldSpec {
    pub fn new(kind: FieldType, nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut spec = FieldSpec {
            kind,
            missing: None,
            validators: Vec::new(),
        };
        for node in nodes {
            match node {
                Node::Missing(default) => spec.missing = Some(default),
                Node::Validator(validator) => spec.validators.push(validator),
            }
        }
        spec
    }

    pub fn is_required(&self) -> bool {
        self.missing.is_none()
    }

    fn clean(&self, raw: Option<&FieldValue>) -> Result<Cleaned, String> {
        let present = raw.filter(|v| !is_blank(v));
        let value = match present {
            Some(raw) => self.kind.deserialize(raw)?,
            None => return self.missing.clone().ok_or_else(|| REQUIRED.to_string()),
        };
        for validator in &self.validators {
            validator(&value)?;
        }
        Ok(value)
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("kind", &self.kind)
            .field("missing", &self.missing)
            .field("validators", &self.validators.len())
            .finish()
    }
}

fn is_blank(value: &FieldValue) -> bool {
    match value {
        FieldValue::Null => true,
        FieldValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Ordered set of named fields.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(
        mut self,
        name: impl Into<String>,
        kind: FieldType,
        nodes: impl IntoIterator<Item = Node>,
    ) -> Self {
        self.fields.insert(name.into(), FieldSpec::new(kind, nodes));
        self
    }

    /// Add every field of `other`, replacing same-named fields.
    pub fn merge(mut self, other: Schema) -> Self {
        self.fields.extend(other.fields);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldSpec> {
        self.fields.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Output of a successful validation: one cleaned value per schema field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    values: IndexMap<String, Cleaned>,
}

impl Validated {
    pub fn get(&self, name: &str) -> Option<&Cleaned> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<String> {
        match self.get(name) {
            Some(Cleaned::Str(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// A required text field; empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.str(name).unwrap_or_default()
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Cleaned::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(Cleaned::Float(x)) => Some(*x),
            Some(Cleaned::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(Cleaned::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.get(name) {
            Some(Cleaned::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn uuid(&self, name: &str) -> Option<Guid> {
        match self.get(name) {
            Some(Cleaned::Uuid(u)) => Some(*u),
            _ => None,
        }
    }

    pub fn choice<E: Choice>(&self, name: &str) -> Option<E> {
        match self.get(name) {
            Some(Cleaned::Choice(v)) => E::from_value(*v),
            Some(Cleaned::Int(v)) => i32::try_from(*v).ok().and_then(E::from_value),
            Some(Cleaned::Str(s)) => E::from_name(s),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Cleaned)> {
        self.values.iter()
    }
}

/// Validate `data` against `schema`. Unknown keys are ignored. On failure
/// the returned data is empty and the error dictionary names every failing
/// field.
pub fn validate(schema: &Schema, data: &DataDict) -> (Validated, Option<ErrorDict>) {
    let mut values = IndexMap::new();
    let mut errors = ErrorDict::new();

    for (name, spec) in &schema.fields {
        match spec.clean(data.get(name)) {
            Ok(value) => {
                values.insert(name.clone(), value);
            }
            Err(message) => {
                errors.insert(name.clone(), message);
            }
        }
    }

    if errors.is_empty() {
        (Validated { values }, None)
    } else {
        tracing::debug!("Validation failed: {:?}", errors);
        (Validated::default(), Some(errors))
    }
}

/// Accepts http(s) and (s)ftp URLs, with or without the scheme.
pub fn url() -> Validator {
    static URL: OnceLock<Regex> = OnceLock::new();
    Arc::new(|value| {
        let pattern = URL.get_or_init(|| {
            Regex::new(
                r"(?i)^((https?|s?ftp)://)?(localhost|([a-z0-9]([a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,})(:\d+)?(/\S*)?$",
            )
            .expect("valid regex")
        });
        match value {
            Cleaned::Str(s) if pattern.is_match(s.trim()) => Ok(()),
            Cleaned::Null => Ok(()),
            _ => Err("Must be a URL".to_string()),
        }
    })
}

/// Bounds the character length of a text value.
pub fn length(min: Option<usize>, max: Option<usize>) -> Validator {
    Arc::new(move |value| {
        let Cleaned::Str(s) = value else {
            return Ok(());
        };
        let len = s.chars().count();
        if let Some(min) = min {
            if len < min {
                return Err(format!("Shorter than minimum length {}", min));
            }
        }
        if let Some(max) = max {
            if len > max {
                return Err(format!("Longer than maximum length {}", max));
            }
        }
        Ok(())
    })
}

/// Accepts a variant name or integer value of `E`.
pub fn one_of_enum<E: Choice>() -> Validator {
    Arc::new(|value| match value {
        Cleaned::Str(s) if E::from_name(s).is_some() => Ok(()),
        Cleaned::Str(s) => Err(format!("'{}' is not a valid {}", s, E::TYPE_NAME)),
        Cleaned::Int(i) => match i32::try_from(*i).ok().and_then(E::from_value) {
            Some(_) => Ok(()),
            None => Err(format!("{} is not a valid value for {}", i, E::TYPE_NAME)),
        },
        Cleaned::Choice(v) if E::from_value(*v).is_some() => Ok(()),
        Cleaned::Null => Ok(()),
        other => Err(format!("{} is not a valid value for {}", other, E::TYPE_NAME)),
    })
}
