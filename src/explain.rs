/// Structured decomposition of a score into its arithmetic contributors.
///
/// An `Explain` node carries a value, a human-readable description, and the
/// child nodes the value was computed from. `Display` renders an indented
/// tree; `to_json` renders the same structure for machine consumers.
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explain {
    value: f32,
    description: String,
    details: Vec<Explain>,
}

impl Explain {
    /// A leaf contributor with no sub-structure.
    pub fn leaf(value: f32, description: impl Into<String>) -> Self {
        Explain {
            value,
            description: description.into(),
            details: Vec::new(),
        }
    }

    /// An intermediate node computed from `details`.
    pub fn node(value: f32, description: impl Into<String>, details: Vec<Explain>) -> Self {
        Explain {
            value,
            description: description.into(),
            details,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> &[Explain] {
        &self.details
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "value": self.value,
            "description": self.description,
            "details": self.details.iter().map(Explain::to_json).collect::<Vec<_>>(),
        })
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{}{} = {}",
            "  ".repeat(depth),
            self.value,
            self.description
        )?;
        for detail in &self.details {
            detail.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
