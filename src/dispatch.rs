// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ordered dispatch and teardown of template sequences against a spoke's hub namespace.

use crate::document::RenderedDocument;
use crate::error::Result;
use crate::kubernetes::{ApplyOutcome, KindResolver, RemoteApplier, ResourceCollectionRef};
use crate::templates::{render, ResourceTemplate, TemplateData};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Renders, resolves and applies templates one after the other.
///
/// The first failing step aborts the sequence. Objects created by earlier
/// steps are left in place: creation is idempotent, so dispatching the same
/// sequence again picks up where it stopped.
#[derive(Clone)]
pub struct Dispatcher {
    applier: RemoteApplier,
    resolver: Arc<KindResolver>,
    recovery_path: String,
}

impl Dispatcher {
    pub fn new(applier: RemoteApplier, resolver: Arc<KindResolver>, recovery_path: &str) -> Self {
        Self {
            applier,
            resolver,
            recovery_path: recovery_path.to_string(),
        }
    }

    /// Create every templated object in list order
    #[instrument(skip(self, templates), fields(steps = templates.len()))]
    pub async fn dispatch(&self, cluster: &str, templates: &[ResourceTemplate]) -> Result<()> {
        for template in templates {
            self.create_step(cluster, template)
                .await
                .map_err(|e| e.in_step(&template.name, cluster))?;
        }
        info!("Dispatched {} objects to cluster {}", templates.len(), cluster);
        Ok(())
    }

    /// Delete every templated object, last first. Missing objects count as deleted.
    #[instrument(skip(self, templates), fields(steps = templates.len()))]
    pub async fn teardown(&self, cluster: &str, templates: &[ResourceTemplate]) -> Result<()> {
        for template in templates.iter().rev() {
            self.delete_step(cluster, template)
                .await
                .map_err(|e| e.in_step(&template.name, cluster))?;
        }
        info!("Tore down {} objects for cluster {}", templates.len(), cluster);
        Ok(())
    }

    /// Render a template for a cluster and resolve the collection it belongs to
    pub async fn materialize(
        &self,
        cluster: &str,
        template: &ResourceTemplate,
    ) -> Result<(RenderedDocument, ResourceCollectionRef)> {
        let data = TemplateData::new(cluster, &self.recovery_path);
        let rendered = render(template, &data)?;
        let doc = RenderedDocument::from_yaml(&rendered)?;
        let kind = doc.kind_identity()?;
        debug!("Template {} renders a {}", template.name, kind);
        let collection = self.resolver.resolve(&kind).await?;
        Ok((doc, collection))
    }

    async fn create_step(&self, cluster: &str, template: &ResourceTemplate) -> Result<()> {
        debug!("Creating object {} for cluster {}", template.name, cluster);
        let (doc, collection) = self.materialize(cluster, template).await?;

        match self.applier.create(cluster, doc, &collection).await? {
            ApplyOutcome::Created => debug!("Created {}", template.name),
            ApplyOutcome::AlreadyExists => {
                info!("{} already present in {}, continuing", template.name, cluster)
            }
        }
        Ok(())
    }

    async fn delete_step(&self, cluster: &str, template: &ResourceTemplate) -> Result<()> {
        let (doc, collection) = self.materialize(cluster, template).await?;
        let name = doc.name()?;

        match self.applier.delete(cluster, name, &collection).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("{} already gone from {}", name, cluster);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::templates::builtin;
    use crate::test_utils::{
        already_exists_json, api_resource_list_json, object_json, status_json, MockService,
    };

    const ACTION_GROUP_PATH: &str = "/apis/action.open-cluster-management.io/v1beta1";
    const VIEW_GROUP_PATH: &str = "/apis/view.open-cluster-management.io/v1beta1";
    const ACTIONS_PATH: &str =
        "/apis/action.open-cluster-management.io/v1beta1/namespaces/spoke-1/managedclusteractions";
    const VIEWS_PATH: &str =
        "/apis/view.open-cluster-management.io/v1beta1/namespaces/spoke-1/managedclusterviews";

    fn discovery_mock() -> MockService {
        MockService::new()
            .on_get(
                ACTION_GROUP_PATH,
                200,
                &api_resource_list_json(
                    "action.open-cluster-management.io/v1beta1",
                    "ManagedClusterAction",
                    "managedclusteractions",
                ),
            )
            .on_get(
                VIEW_GROUP_PATH,
                200,
                &api_resource_list_json(
                    "view.open-cluster-management.io/v1beta1",
                    "ManagedClusterView",
                    "managedclusterviews",
                ),
            )
    }

    fn action_json(name: &str) -> String {
        object_json(
            "action.open-cluster-management.io/v1beta1",
            "ManagedClusterAction",
            "spoke-1",
            name,
        )
    }

    fn view_json(name: &str) -> String {
        object_json(
            "view.open-cluster-management.io/v1beta1",
            "ManagedClusterView",
            "spoke-1",
            name,
        )
    }

    fn dispatcher(service: &MockService) -> Dispatcher {
        let client = service.clone().into_client();
        let resolver = Arc::new(KindResolver::new(client.clone(), 8, 0));
        Dispatcher::new(RemoteApplier::new(client), resolver, "s3://backups/hub")
    }

    fn posted_names(service: &MockService) -> Vec<String> {
        service
            .requests()
            .iter()
            .filter(|r| r.method == "POST")
            .filter_map(|r| r.object_name().map(String::from))
            .collect()
    }

    #[tokio::test]
    async fn test_creates_in_list_order() {
        let service = discovery_mock()
            .on_post(ACTIONS_PATH, 201, &action_json("created"))
            .on_post(VIEWS_PATH, 201, &view_json("created"));

        dispatcher(&service)
            .dispatch("spoke-1", &builtin::create_sequence())
            .await
            .unwrap();

        assert_eq!(
            posted_names(&service),
            vec![
                "backup-create-namespace",
                "backup-create-serviceaccount",
                "backup-create-rolebinding",
                "backup-create-job",
                "backup-create-clusterview",
            ]
        );
    }

    #[tokio::test]
    async fn test_objects_scoped_to_cluster_namespace() {
        let service = discovery_mock().on_post(ACTIONS_PATH, 201, &action_json("created"));

        dispatcher(&service)
            .dispatch("spoke-1", &builtin::create_sequence()[..1])
            .await
            .unwrap();

        let posts: Vec<_> = service
            .requests()
            .into_iter()
            .filter(|r| r.method == "POST")
            .collect();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].path, ACTIONS_PATH);
        assert_eq!(
            posts[0].body.as_ref().unwrap()["metadata"]["namespace"],
            "spoke-1"
        );
    }

    #[tokio::test]
    async fn test_redispatch_is_idempotent() {
        let mut service = discovery_mock();
        for _ in 0..4 {
            service = service.on_post(ACTIONS_PATH, 201, &action_json("created"));
        }
        let service = service
            .on_post(
                ACTIONS_PATH,
                409,
                &already_exists_json("managedclusteractions", "backup"),
            )
            .on_post(VIEWS_PATH, 201, &view_json("created"))
            .on_post(
                VIEWS_PATH,
                409,
                &already_exists_json("managedclusterviews", "backup"),
            );
        let dispatcher = dispatcher(&service);
        let templates = builtin::create_sequence();

        dispatcher.dispatch("spoke-1", &templates).await.unwrap();
        dispatcher.dispatch("spoke-1", &templates).await.unwrap();

        let names = posted_names(&service);
        assert_eq!(names.len(), 10);
        assert_eq!(names[..5], names[5..]);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_steps() {
        let service = discovery_mock()
            .on_post(ACTIONS_PATH, 201, &action_json("created"))
            .on_post(
                ACTIONS_PATH,
                403,
                &status_json(403, "Forbidden", "actions are forbidden"),
            )
            .on_post(ACTIONS_PATH, 201, &action_json("created"));

        let err = dispatcher(&service)
            .dispatch("spoke-1", &builtin::create_sequence()[..4])
            .await
            .unwrap_err();

        match err {
            RelayError::StepFailed {
                step,
                cluster,
                source,
            } => {
                assert_eq!(step, "backup-create-serviceaccount");
                assert_eq!(cluster, "spoke-1");
                assert!(matches!(*source, RelayError::KubeError(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            posted_names(&service),
            vec!["backup-create-namespace", "backup-create-serviceaccount"]
        );
    }

    #[tokio::test]
    async fn test_render_failure_identifies_step() {
        let service = discovery_mock().on_post(ACTIONS_PATH, 201, &action_json("created"));
        let mut templates = builtin::create_sequence()[..2].to_vec();
        templates.insert(1, ResourceTemplate::new("broken", "name: {{ region }}\n"));

        let err = dispatcher(&service)
            .dispatch("spoke-1", &templates)
            .await
            .unwrap_err();

        match err {
            RelayError::StepFailed { step, source, .. } => {
                assert_eq!(step, "broken");
                assert!(matches!(*source, RelayError::TemplateRender { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(posted_names(&service), vec!["backup-create-namespace"]);
    }

    #[tokio::test]
    async fn test_unknown_kind_aborts_before_create() {
        // No discovery answers at all
        let service = MockService::new();

        let err = dispatcher(&service)
            .dispatch("spoke-1", &builtin::create_sequence())
            .await
            .unwrap_err();

        match err {
            RelayError::StepFailed { step, source, .. } => {
                assert_eq!(step, "backup-create-namespace");
                assert!(matches!(*source, RelayError::KindResolution { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(posted_names(&service).is_empty());
    }

    #[tokio::test]
    async fn test_kinds_resolved_once_per_dispatcher() {
        let service = discovery_mock()
            .on_post(ACTIONS_PATH, 201, &action_json("created"))
            .on_post(VIEWS_PATH, 201, &view_json("created"));
        let dispatcher = dispatcher(&service);

        dispatcher
            .dispatch("spoke-1", &builtin::create_sequence())
            .await
            .unwrap();
        dispatcher
            .dispatch("spoke-1", &builtin::create_sequence())
            .await
            .unwrap();

        assert_eq!(service.count("GET", ACTION_GROUP_PATH), 1);
        assert_eq!(service.count("GET", VIEW_GROUP_PATH), 1);
    }

    #[tokio::test]
    async fn test_teardown_deletes_in_reverse_and_tolerates_missing() {
        let namespace_path = format!("{}/backup-create-namespace", ACTIONS_PATH);
        let view_path = format!("{}/backup-create-clusterview", VIEWS_PATH);
        // Only these two exist, everything else answers 404
        let service = discovery_mock()
            .on_delete(&namespace_path, 200, &action_json("backup-create-namespace"))
            .on_delete(&view_path, 200, &view_json("backup-create-clusterview"));

        dispatcher(&service)
            .teardown("spoke-1", &builtin::create_sequence())
            .await
            .unwrap();

        let deleted: Vec<String> = service
            .requests()
            .iter()
            .filter(|r| r.method == "DELETE")
            .map(|r| r.path.rsplit('/').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            deleted,
            vec![
                "backup-create-clusterview",
                "backup-create-job",
                "backup-create-rolebinding",
                "backup-create-serviceaccount",
                "backup-create-namespace",
            ]
        );
    }

    #[tokio::test]
    async fn test_teardown_aborts_on_transport_error() {
        let view_path = format!("{}/backup-create-clusterview", VIEWS_PATH);
        let service = discovery_mock().on_delete(
            &view_path,
            500,
            &status_json(500, "InternalError", "storage failure"),
        );

        let err = dispatcher(&service)
            .teardown("spoke-1", &builtin::create_sequence())
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::StepFailed { ref step, .. } if step == "backup-create-clusterview"));
        assert_eq!(
            service
                .requests()
                .iter()
                .filter(|r| r.method == "DELETE")
                .count(),
            1
        );
    }
}
