//! Parameter values, kinds and descriptors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{GraphError, Result};

/// A parameter value held by a stage or exposed by a meta-operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Color(Color),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Bool(_) => ParamKind::Bool,
            Self::Int(_) => ParamKind::Int,
            Self::Float(_) => ParamKind::Float,
            Self::Color(_) => ParamKind::Color,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            Self::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match *self {
            Self::Color(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Color(c) => write!(f, "{c}"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Color> for ParamValue {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}

/// The type of a parameter, independent of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    Color,
}

impl ParamKind {
    /// Whether a value of kind `other` can be stored in a parameter of this kind.
    pub fn accepts(self, other: ParamKind) -> bool {
        self == other || (self == Self::Float && other == Self::Int)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float => "real number",
            Self::Color => "color",
        };
        f.pad(name)
    }
}

/// Collection of parameter values keyed by name, in name order.
pub type ParamValues = BTreeMap<String, ParamValue>;

/// Declares one named parameter: its kind (from the default), default value
/// and, for numeric parameters, the accepted value range.
///
/// A missing bound means the range is open on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub default: ParamValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, default: ParamValue) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            default,
            min: None,
            max: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn kind(&self) -> ParamKind {
        self.default.kind()
    }

    /// Type-check `value` against this descriptor and clamp numbers into range.
    pub fn coerce(&self, value: ParamValue) -> Result<ParamValue> {
        let expected = self.kind();
        if !expected.accepts(value.kind()) {
            return Err(GraphError::ParamType {
                name: self.name.clone(),
                expected,
                got: value.kind(),
            });
        }

        if value.as_f64().is_some_and(|v| !v.is_finite()) {
            return Err(GraphError::OutOfRange {
                name: self.name.clone(),
                value: value.to_string(),
            });
        }

        Ok(match (expected, value) {
            (ParamKind::Float, v) => {
                let raw = v.as_f64().unwrap_or_default();
                ParamValue::Float(self.clamp(raw))
            }
            (ParamKind::Int, ParamValue::Int(v)) => {
                ParamValue::Int(self.clamp(v as f64).round() as i64)
            }
            (_, v) => v,
        })
    }

    /// Parse a textual value (`6.0`, `true`, `#ff9dff`) and coerce it.
    pub fn parse(&self, text: &str) -> Result<ParamValue> {
        let text = text.trim();
        let bad = || GraphError::Parse(format!("{:?} is not a valid {} for {}", text, self.kind(), self.name));
        let value = match self.kind() {
            ParamKind::Bool => match text {
                "true" | "on" | "1" => ParamValue::Bool(true),
                "false" | "off" | "0" => ParamValue::Bool(false),
                _ => return Err(bad()),
            },
            ParamKind::Int => ParamValue::Int(text.parse().map_err(|_| bad())?),
            ParamKind::Float => ParamValue::Float(text.parse().map_err(|_| bad())?),
            ParamKind::Color => ParamValue::Color(Color::from_hex(text)?),
        };
        self.coerce(value)
    }

    /// Whether `v` lies inside the declared range unchanged.
    pub fn in_range(&self, v: f64) -> bool {
        self.min.map_or(true, |min| v >= min) && self.max.map_or(true, |max| v <= max)
    }

    /// Whether every value `other` accepts is also accepted here.
    pub fn covers(&self, other: &ParamDescriptor) -> bool {
        let low = match (self.min, other.min) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(mine), Some(theirs)) => mine <= theirs,
        };
        let high = match (self.max, other.max) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(mine), Some(theirs)) => mine >= theirs,
        };
        low && high
    }

    fn clamp(&self, v: f64) -> f64 {
        let v = self.min.map_or(v, |min| v.max(min));
        self.max.map_or(v, |max| v.min(max))
    }
}
