// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Template rendering with Tera

use crate::error::{RelayError, Result};
use crate::templates::{ResourceTemplate, TemplateData, COMMON_PREAMBLE};
use std::error::Error as _;
use tera::{Context, Tera};
use tracing::{debug, instrument};

/// Render a template body with the shared preamble in front of it.
///
/// The template's own name always wins over `data.resource_name`.
#[instrument(skip(template, data), fields(template = %template.name, cluster = %data.cluster_name))]
pub fn render(template: &ResourceTemplate, data: &TemplateData) -> Result<String> {
    let source = format!("{}{}", COMMON_PREAMBLE, template.body);

    let mut tera = Tera::default();
    tera.add_raw_template(&template.name, &source)
        .map_err(|e| RelayError::TemplateSyntax {
            template: template.name.clone(),
            message: describe(&e),
        })?;

    let data = TemplateData {
        resource_name: template.name.clone(),
        ..data.clone()
    };
    let context = Context::from_serialize(&data).map_err(|e| RelayError::TemplateRender {
        template: template.name.clone(),
        message: describe(&e),
    })?;

    let rendered = tera
        .render(&template.name, &context)
        .map_err(|e| RelayError::TemplateRender {
            template: template.name.clone(),
            message: describe(&e),
        })?;

    debug!("Rendered template {}", template.name);
    Ok(rendered)
}

/// Tera keeps the useful part of its errors in the source chain
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
