//! Shape validation of untrusted model output.
//!
//! The model's JSON is checked field by field and converted into a typed
//! [`RoadmapDraft`]. The first offending field is reported by path
//! (`steps[1].resources[0]`). A step without a `resources` key gets an
//! empty list; that is the only default applied.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use pathwise_db::models::Step;

/// What was wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaProblem {
    Missing,
    WrongType { expected: &'static str },
    Empty,
}

impl fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("is missing"),
            Self::WrongType { expected } => write!(f, "must be {expected}"),
            Self::Empty => f.write_str("must not be empty"),
        }
    }
}

/// The model output does not have the roadmap shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{path}` {problem}")]
pub struct SchemaError {
    pub path: String,
    pub problem: SchemaProblem,
}

impl SchemaError {
    fn new(path: impl Into<String>, problem: SchemaProblem) -> Self {
        Self {
            path: path.into(),
            problem,
        }
    }
}

/// A validated roadmap body. Identity, owner and timestamp are assigned by
/// the caller before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapDraft {
    pub title: String,
    pub description: String,
    pub steps: Vec<Step>,
}

/// Validate an untyped value into a [`RoadmapDraft`].
pub fn validate_roadmap(value: &Value) -> Result<RoadmapDraft, SchemaError> {
    let root = value
        .as_object()
        .ok_or_else(|| SchemaError::new("$", SchemaProblem::WrongType { expected: "an object" }))?;

    let title = required_string(root, "title", "title")?;
    let description = required_string(root, "description", "description")?;

    let steps_value = root
        .get("steps")
        .ok_or_else(|| SchemaError::new("steps", SchemaProblem::Missing))?;
    let items = steps_value
        .as_array()
        .ok_or_else(|| SchemaError::new("steps", SchemaProblem::WrongType { expected: "an array" }))?;
    if items.is_empty() {
        return Err(SchemaError::new("steps", SchemaProblem::Empty));
    }

    let steps = items
        .iter()
        .enumerate()
        .map(|(i, item)| validate_step(item, &format!("steps[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RoadmapDraft {
        title,
        description,
        steps,
    })
}

fn validate_step(value: &Value, path: &str) -> Result<Step, SchemaError> {
    let obj = value
        .as_object()
        .ok_or_else(|| SchemaError::new(path, SchemaProblem::WrongType { expected: "an object" }))?;

    let title = required_string(obj, "title", &format!("{path}.title"))?;
    let description = required_string(obj, "description", &format!("{path}.description"))?;

    let resources_path = format!("{path}.resources");
    let resources = match obj.get("resources") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_owned).ok_or_else(|| {
                    SchemaError::new(
                        format!("{resources_path}[{i}]"),
                        SchemaProblem::WrongType { expected: "a string" },
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(SchemaError::new(
                resources_path,
                SchemaProblem::WrongType { expected: "an array" },
            ));
        }
    };

    Ok(Step {
        title,
        description,
        resources,
    })
}

fn required_string(obj: &Map<String, Value>, key: &str, path: &str) -> Result<String, SchemaError> {
    match obj.get(key) {
        None => Err(SchemaError::new(path, SchemaProblem::Missing)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(SchemaError::new(
            path,
            SchemaProblem::WrongType { expected: "a string" },
        )),
    }
}
