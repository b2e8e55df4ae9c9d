// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Named resource templates for the action and view objects written to the hub.

pub mod builtin;
pub mod renderer;

pub use builtin::COMMON_PREAMBLE;
pub use renderer::render;

use crate::document::RenderedDocument;
use crate::error::{RelayError, Result};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// A template body paired with the name of the object it renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTemplate {
    /// Must equal `metadata.name` of the rendered object
    pub name: String,
    pub body: String,
}

impl ResourceTemplate {
    pub fn new(name: &str, body: &str) -> Self {
        Self {
            name: name.to_string(),
            body: body.to_string(),
        }
    }
}

/// Values available to every template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateData {
    pub resource_name: String,
    pub cluster_name: String,
    pub recovery_path: String,
}

impl TemplateData {
    pub fn new(cluster_name: &str, recovery_path: &str) -> Self {
        Self {
            resource_name: String::new(),
            cluster_name: cluster_name.to_string(),
            recovery_path: recovery_path.to_string(),
        }
    }

    /// Synthetic data used to validate templates at startup
    pub fn probe() -> Self {
        Self::new("registry-probe", "/registry/probe")
    }
}

/// Ordered template sequences for each logical operation
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    create: Vec<ResourceTemplate>,
    observe: Vec<ResourceTemplate>,
    delete: Vec<ResourceTemplate>,
}

impl TemplateRegistry {
    /// Build a registry, rendering every template once to check it names itself correctly.
    /// The observe sequence must not be empty, a backup is only confirmed through a view.
    pub fn new(
        create: Vec<ResourceTemplate>,
        observe: Vec<ResourceTemplate>,
        delete: Vec<ResourceTemplate>,
    ) -> Result<Self> {
        for sequence in [&create, &observe, &delete] {
            validate_sequence(sequence)?;
        }
        if observe.is_empty() {
            return Err(RelayError::EmptySequence("observe".to_string()));
        }
        Ok(Self {
            create,
            observe,
            delete,
        })
    }

    /// The backup sequences shipped with the relay
    pub fn builtin() -> Result<Self> {
        Self::new(
            builtin::create_sequence(),
            builtin::observe_sequence(),
            builtin::delete_sequence(),
        )
    }

    pub fn create(&self) -> &[ResourceTemplate] {
        &self.create
    }

    pub fn observe(&self) -> &[ResourceTemplate] {
        &self.observe
    }

    pub fn delete(&self) -> &[ResourceTemplate] {
        &self.delete
    }
}

fn validate_sequence(sequence: &[ResourceTemplate]) -> Result<()> {
    let mut seen = HashSet::new();
    for template in sequence {
        if !seen.insert(template.name.as_str()) {
            return Err(RelayError::DuplicateTemplate(template.name.clone()));
        }
        validate_template(template)?;
    }
    Ok(())
}

fn validate_template(template: &ResourceTemplate) -> Result<()> {
    let rendered = render(template, &TemplateData::probe())?;
    let doc = RenderedDocument::from_yaml(&rendered)?;
    doc.kind_identity()?;

    let declared = doc.opt_str_at(&["metadata", "name"])?;
    if declared != Some(template.name.as_str()) {
        return Err(RelayError::TemplateNameMismatch {
            template: template.name.clone(),
            found: declared.map(String::from),
        });
    }

    debug!("Template {} validated", template.name);
    Ok(())
}
