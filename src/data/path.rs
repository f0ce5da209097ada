//! Container / group / array name triplets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Address of an array (or, with an empty `array`, a group) inside a registry.
///
/// Written as `Container/Group/Array`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DataPath {
    pub container: String,
    pub group: String,
    pub array: String,
}

impl DataPath {
    pub fn new(
        container: impl Into<String>,
        group: impl Into<String>,
        array: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            group: group.into(),
            array: array.into(),
        }
    }

    /// Path of a sibling array in the same group.
    pub fn sibling(&self, array: impl Into<String>) -> Self {
        Self {
            container: self.container.clone(),
            group: self.group.clone(),
            array: array.into(),
        }
    }

    /// Whether every segment is non-empty.
    pub fn is_complete(&self) -> bool {
        !self.container.is_empty() && !self.group.is_empty() && !self.array.is_empty()
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.container, self.group, self.array)
    }
}

impl FromStr for DataPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(g), Some(a), None) => Ok(DataPath::new(c, g, a)),
            _ => Err(format!(
                "data path '{}' must have the form Container/Group/Array",
                s
            )),
        }
    }
}
