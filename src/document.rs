// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Structured documents for dynamically typed API objects.
//!
//! Rendered templates and objects read back from the hub are handled as a
//! JSON tree. Accessors return [`RelayError::SchemaMismatch`] when the tree
//! does not have the expected shape.

use crate::error::{RelayError, Result};
use crate::types::Condition;
use kube::core::{DynamicObject, GroupVersionKind};
use serde_json::Value;
use std::fmt;

/// (group, version, kind) of an API object, the core group is the empty string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KindIdentity {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl KindIdentity {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Split an `apiVersion` string into group and version
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::new("", api_version, kind),
        }
    }

    pub fn to_gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, &self.kind)
    }
}

impl fmt::Display for KindIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.kind)
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.kind)
        }
    }
}

/// A single API object as a key/value tree
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    root: Value,
}

impl RenderedDocument {
    /// Parse rendered YAML text. The top level must be a mapping.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text).map_err(|e| RelayError::SchemaMismatch {
            path: "<root>".to_string(),
            message: format!("invalid YAML: {}", e),
        })?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_object() {
            return Err(RelayError::SchemaMismatch {
                path: "<root>".to_string(),
                message: format!("expected a mapping, found {}", type_name(&root)),
            });
        }
        Ok(Self { root })
    }

    pub fn from_dynamic(obj: DynamicObject) -> Result<Self> {
        let root = serde_json::to_value(obj).map_err(|e| RelayError::SchemaMismatch {
            path: "<root>".to_string(),
            message: e.to_string(),
        })?;
        Self::from_value(root)
    }

    pub fn into_dynamic(self) -> Result<DynamicObject> {
        serde_json::from_value(self.root).map_err(|e| RelayError::SchemaMismatch {
            path: "<root>".to_string(),
            message: format!("not a valid API object: {}", e),
        })
    }

    /// Look up a nested value, `None` when any segment is missing
    pub fn lookup(&self, path: &[&str]) -> Result<Option<&Value>> {
        let mut current = &self.root;
        for (depth, key) in path.iter().enumerate() {
            match current {
                Value::Object(map) => match map.get(*key) {
                    Some(next) => current = next,
                    None => return Ok(None),
                },
                Value::Null => return Ok(None),
                other => {
                    return Err(mismatch(
                        &path[..depth],
                        format!("expected a mapping, found {}", type_name(other)),
                    ))
                }
            }
        }
        Ok(Some(current))
    }

    pub fn opt_str_at(&self, path: &[&str]) -> Result<Option<&str>> {
        match self.lookup(path)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(mismatch(
                path,
                format!("expected a string, found {}", type_name(other)),
            )),
        }
    }

    pub fn str_at(&self, path: &[&str]) -> Result<&str> {
        self.opt_str_at(path)?
            .ok_or_else(|| mismatch(path, "required field is missing".to_string()))
    }

    pub fn list_at(&self, path: &[&str]) -> Result<Option<&Vec<Value>>> {
        match self.lookup(path)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(mismatch(
                path,
                format!("expected a list, found {}", type_name(other)),
            )),
        }
    }

    pub fn name(&self) -> Result<&str> {
        self.str_at(&["metadata", "name"])
    }

    pub fn kind_identity(&self) -> Result<KindIdentity> {
        let api_version = self.str_at(&["apiVersion"])?;
        let kind = self.str_at(&["kind"])?;
        Ok(KindIdentity::from_api_version(api_version, kind))
    }
}

/// Conditions reported on a view resource, in the order the agent appended them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationResult {
    pub conditions: Vec<Condition>,
}

impl ObservationResult {
    /// Read `status.conditions`. A view the agent has not reported on yet has none.
    pub fn from_document(doc: &RenderedDocument) -> Result<Self> {
        let path = ["status", "conditions"];
        let Some(items) = doc.list_at(&path)? else {
            return Ok(Self::default());
        };

        let conditions = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value::<Condition>(item.clone()).map_err(|e| {
                    RelayError::SchemaMismatch {
                        path: format!("status.conditions[{}]", i),
                        message: e.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { conditions })
    }

    /// Only the most recently appended condition is authoritative
    pub fn latest(&self) -> Option<&Condition> {
        self.conditions.last()
    }

    pub fn latest_status(&self) -> Option<&str> {
        self.latest().map(|c| c.status.as_str())
    }
}

fn mismatch(path: &[&str], message: String) -> RelayError {
    let path = if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    };
    RelayError::SchemaMismatch { path, message }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
