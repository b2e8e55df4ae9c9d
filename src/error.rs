// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Failed to parse template {template}: {message}")]
    TemplateSyntax { template: String, message: String },

    #[error("Failed to render template {template}: {message}")]
    TemplateRender { template: String, message: String },

    #[error("Template {template} declares object name {found:?}")]
    TemplateNameMismatch {
        template: String,
        found: Option<String>,
    },

    #[error("Template {0} appears more than once in its sequence")]
    DuplicateTemplate(String),

    #[error("Template sequence {0} is empty")]
    EmptySequence(String),

    #[error("Schema mismatch at {path}: {message}")]
    SchemaMismatch { path: String, message: String },

    #[error("Failed to resolve kind {kind}: {message}")]
    KindResolution { kind: String, message: String },

    #[error("{resource} {namespace}/{name} not found")]
    NotFound {
        resource: String,
        namespace: String,
        name: String,
    },

    #[error("Step {step} failed for cluster {cluster}: {source}")]
    StepFailed {
        step: String,
        cluster: String,
        #[source]
        source: Box<RelayError>,
    },

    #[error("Spoke cluster not available: {0}")]
    ClusterNotAvailable(String),
}

impl RelayError {
    /// Wrap an error with the dispatch step and cluster it happened in
    pub fn in_step(self, step: &str, cluster: &str) -> Self {
        RelayError::StepFailed {
            step: step.to_string(),
            cluster: cluster.to_string(),
            source: Box::new(self),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RelayError::NotFound { .. })
    }
}

/// True when the API server answered with the given HTTP status code
pub fn is_api_status(err: &kube::Error, code: u16) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == code)
}

pub type Result<T> = std::result::Result<T, RelayError>;
