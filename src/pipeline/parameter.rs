//! Filter parameters.
//!
//! Each filter declares a static table of [`Parameter`] descriptors, the same
//! way nodes declare their ports. The blanket [`ParameterAccess`] impl turns a
//! table into name-based get/set that works through `dyn Filter`, which is
//! what pipeline files and the CLI use.

use crate::data::DataPath;
use crate::pipeline::error::FilterError;
use crate::types::ElementType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterKind {
    Bool,
    Integer,
    Float,
    Text,
    IntVec3,
    FloatVec3,
    DataPath,
    ElementType,
    /// Text restricted to the listed options.
    Choice(&'static [&'static str]),
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Bool => f.write_str("bool"),
            ParameterKind::Integer => f.write_str("integer"),
            ParameterKind::Float => f.write_str("float"),
            ParameterKind::Text => f.write_str("text"),
            ParameterKind::IntVec3 => f.write_str("int[3]"),
            ParameterKind::FloatVec3 => f.write_str("float[3]"),
            ParameterKind::DataPath => f.write_str("path"),
            ParameterKind::ElementType => f.write_str("element type"),
            ParameterKind::Choice(options) => write!(f, "one of {}", options.join("|")),
        }
    }
}

/// A parameter value as stored in pipeline files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    IntVec3([i64; 3]),
    FloatVec3([f64; 3]),
    DataPath(DataPath),
    ElementType(ElementType),
}

impl ParameterValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers are accepted where a float is expected.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_vec3(&self) -> Option<[i64; 3]> {
        match self {
            ParameterValue::IntVec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float_vec3(&self) -> Option<[f64; 3]> {
        match self {
            ParameterValue::FloatVec3(v) => Some(*v),
            ParameterValue::IntVec3(v) => Some(v.map(|x| x as f64)),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&DataPath> {
        match self {
            ParameterValue::DataPath(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_element_type(&self) -> Option<ElementType> {
        match self {
            ParameterValue::ElementType(v) => Some(*v),
            _ => None,
        }
    }

    /// Coerce into the shape `kind` declares, if compatible.
    pub fn coerce(self, kind: ParameterKind) -> Result<Self, String> {
        let coerced = match (kind, self) {
            (ParameterKind::Bool, v @ ParameterValue::Bool(_)) => v,
            (ParameterKind::Integer, v @ ParameterValue::Integer(_)) => v,
            (ParameterKind::Float, v @ ParameterValue::Float(_)) => v,
            (ParameterKind::Float, ParameterValue::Integer(v)) => ParameterValue::Float(v as f64),
            (ParameterKind::Text, v @ ParameterValue::Text(_)) => v,
            (ParameterKind::IntVec3, v @ ParameterValue::IntVec3(_)) => v,
            (ParameterKind::FloatVec3, v @ ParameterValue::FloatVec3(_)) => v,
            (ParameterKind::FloatVec3, ParameterValue::IntVec3(v)) => {
                ParameterValue::FloatVec3(v.map(|x| x as f64))
            }
            (ParameterKind::DataPath, v @ ParameterValue::DataPath(_)) => v,
            (ParameterKind::DataPath, ParameterValue::Text(s)) => ParameterValue::DataPath(s.parse()?),
            (ParameterKind::ElementType, v @ ParameterValue::ElementType(_)) => v,
            (ParameterKind::ElementType, ParameterValue::Text(s)) => {
                ParameterValue::ElementType(s.parse()?)
            }
            (ParameterKind::Choice(options), ParameterValue::Text(s)) => {
                if !options.contains(&s.as_str()) {
                    return Err(format!("'{}' is not one of {}", s, options.join(", ")));
                }
                ParameterValue::Text(s)
            }
            (kind, v) => return Err(format!("expected {}, got {}", kind, v)),
        };
        Ok(coerced)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Bool(v) => write!(f, "{}", v),
            ParameterValue::Integer(v) => write!(f, "{}", v),
            ParameterValue::Float(v) => write!(f, "{}", v),
            ParameterValue::Text(v) => write!(f, "\"{}\"", v),
            ParameterValue::IntVec3([x, y, z]) => write!(f, "[{}, {}, {}]", x, y, z),
            ParameterValue::FloatVec3([x, y, z]) => write!(f, "[{}, {}, {}]", x, y, z),
            ParameterValue::DataPath(v) => write!(f, "{}", v),
            ParameterValue::ElementType(v) => write!(f, "{}", v),
        }
    }
}

/// Static descriptor of one filter parameter.
pub struct Parameter<F> {
    pub name: &'static str,
    pub label: &'static str,
    pub units: &'static str,
    pub kind: ParameterKind,
    pub get: fn(&F) -> ParameterValue,
    /// Receives a value already coerced to `kind`.
    pub set: fn(&mut F, ParameterValue),
}

/// Snapshot of a parameter for listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub label: &'static str,
    pub units: &'static str,
    pub kind: ParameterKind,
    pub value: ParameterValue,
    pub default: ParameterValue,
}

/// Filters with a static parameter table.
pub trait Configurable: Default + 'static {
    const PARAMETERS: &'static [Parameter<Self>];
}

/// Name-based parameter access, usable through trait objects.
pub trait ParameterAccess {
    fn parameters(&self) -> Vec<ParameterInfo>;

    fn parameter(&self, name: &str) -> Option<ParameterValue>;

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> Result<(), FilterError>;
}

impl<F: Configurable> ParameterAccess for F {
    fn parameters(&self) -> Vec<ParameterInfo> {
        let defaults = F::default();
        F::PARAMETERS
            .iter()
            .map(|p| ParameterInfo {
                name: p.name,
                label: p.label,
                units: p.units,
                kind: p.kind,
                value: (p.get)(self),
                default: (p.get)(&defaults),
            })
            .collect()
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        F::PARAMETERS
            .iter()
            .find(|p| p.name == name)
            .map(|p| (p.get)(self))
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> Result<(), FilterError> {
        let param = F::PARAMETERS
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| FilterError::invalid(name, "no such parameter"))?;
        let value = value
            .coerce(param.kind)
            .map_err(|reason| FilterError::invalid(name, reason))?;
        (param.set)(self, value);
        Ok(())
    }
}
