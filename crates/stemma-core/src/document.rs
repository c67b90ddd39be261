//! Shape validation for the nested genealogy document.
//!
//! Input is plain JSON:
//!
//! ```json
//! { "name": "Adam", "branchKey": "ROOT", "flags": ["mainline"],
//!   "born_am": "0", "died_am": "930",
//!   "children": [ { "name": "Seth" } ] }
//! ```

use crate::flags::{Flag, FlagSet};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// One validated document entry, still nested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_key: Option<String>,
    pub flags: FlagSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub born_marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub died_marker: Option<String>,
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branch_key: None,
            flags: FlagSet::EMPTY,
            born_marker: None,
            died_marker: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<DocumentNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_branch_key(mut self, key: impl Into<String>) -> Self {
        self.branch_key = Some(key.into());
        self
    }

    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.insert(flag);
        self
    }
}

pub fn parse_document_str(text: &str) -> Result<DocumentNode> {
    let value: Value = serde_json::from_str(text)?;
    parse_document(&value)
}

pub fn parse_document(value: &Value) -> Result<DocumentNode> {
    parse_node(value, "$")
}

fn parse_node(value: &Value, path: &str) -> Result<DocumentNode> {
    let Some(obj) = value.as_object() else {
        return Err(Error::malformed(
            path,
            format!("expected an object, found {}", json_kind(value)),
        ));
    };

    // Only the object shape and `children` are structural; any scalar name is shown as text.
    let name = match obj.get("name") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => {
            tracing::warn!(path, kind = json_kind(other), "ignoring non-scalar name");
            String::new()
        }
    };

    // An empty `branchKey` does not define a branch; the node inherits instead.
    let branch_key = obj
        .get("branchKey")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let flags = parse_flags(obj, path);
    let born_marker = display_string(obj.get("born_am"));
    let died_marker = display_string(obj.get("died_am"));

    let children = match obj.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (idx, child) in items.iter().enumerate() {
                out.push(parse_node(child, &format!("{path}.children[{idx}]"))?);
            }
            out
        }
        Some(other) => {
            return Err(Error::malformed(
                &format!("{path}.children"),
                format!("expected an array, found {}", json_kind(other)),
            ));
        }
    };

    Ok(DocumentNode {
        name,
        branch_key,
        flags,
        born_marker,
        died_marker,
        children,
    })
}

fn parse_flags(obj: &Map<String, Value>, path: &str) -> FlagSet {
    let Some(Value::Array(items)) = obj.get("flags") else {
        return FlagSet::EMPTY;
    };
    let mut set = FlagSet::EMPTY;
    for item in items {
        let Some(raw) = item.as_str() else {
            continue;
        };
        match raw.parse::<Flag>() {
            Ok(flag) => set.insert(flag),
            Err(err) => tracing::warn!(path, %err, "ignoring flag outside the known vocabulary"),
        }
    }
    set
}

fn display_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
