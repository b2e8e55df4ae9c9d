// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Create, get and delete of dynamically typed objects in a cluster namespace

use crate::document::RenderedDocument;
use crate::error::{is_api_status, RelayError, Result};
use crate::kubernetes::discovery::ResourceCollectionRef;
use kube::{
    api::{DeleteParams, PostParams},
    core::DynamicObject,
    Api, Client,
};
use tracing::{debug, info, instrument};

/// Result of a create that may find the object already present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created,
    AlreadyExists,
}

/// Transport adapter over the hub API. Never looks inside documents.
#[derive(Clone)]
pub struct RemoteApplier {
    client: Client,
}

impl RemoteApplier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str, collection: &ResourceCollectionRef) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &collection.api_resource())
    }

    #[instrument(skip(self, document, collection), fields(resource = %collection.plural))]
    pub async fn create(
        &self,
        namespace: &str,
        document: RenderedDocument,
        collection: &ResourceCollectionRef,
    ) -> Result<ApplyOutcome> {
        let obj = document.into_dynamic()?;
        let name = obj.metadata.name.clone().unwrap_or_default();

        match self
            .api(namespace, collection)
            .create(&PostParams::default(), &obj)
            .await
        {
            Ok(_) => {
                info!("Created {} {}/{}", collection.kind, namespace, name);
                Ok(ApplyOutcome::Created)
            }
            Err(e) if is_api_status(&e, 409) => {
                debug!("{} {}/{} already exists", collection.kind, namespace, name);
                Ok(ApplyOutcome::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, collection), fields(resource = %collection.plural))]
    pub async fn get(
        &self,
        namespace: &str,
        name: &str,
        collection: &ResourceCollectionRef,
    ) -> Result<DynamicObject> {
        self.api(namespace, collection)
            .get(name)
            .await
            .map_err(|e| not_found_or(e, collection, namespace, name))
    }

    #[instrument(skip(self, collection), fields(resource = %collection.plural))]
    pub async fn delete(
        &self,
        namespace: &str,
        name: &str,
        collection: &ResourceCollectionRef,
    ) -> Result<()> {
        self.api(namespace, collection)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| not_found_or(e, collection, namespace, name))?;
        info!("Deleted {} {}/{}", collection.kind, namespace, name);
        Ok(())
    }
}

fn not_found_or(
    err: kube::Error,
    collection: &ResourceCollectionRef,
    namespace: &str,
    name: &str,
) -> RelayError {
    if is_api_status(&err, 404) {
        RelayError::NotFound {
            resource: collection.plural.clone(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    } else {
        RelayError::KubeError(err)
    }
}
