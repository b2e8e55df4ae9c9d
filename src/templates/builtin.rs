// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Backup action and view templates.
//!
//! Every action is a `ManagedClusterAction` in the spoke's hub namespace that
//! the spoke agent applies locally. The view watches the backup job.

use super::ResourceTemplate;

/// Definitions shared by every template, prepended before parsing
pub const COMMON_PREAMBLE: &str = r#"
{%- set backup_namespace = "cluster-backup" -%}
{%- set service_account = "cluster-backup" -%}
{%- set job_name = "cluster-backup" -%}
{%- set backup_image = "quay.io/stolostron/cluster-backup:latest" -%}
{%- set managed_by = "spoke-relay" -%}
"#;

const CREATE_NAMESPACE: &str = r#"
apiVersion: action.open-cluster-management.io/v1beta1
kind: ManagedClusterAction
metadata:
  name: {{ resource_name }}
  namespace: {{ cluster_name }}
  labels:
    app.kubernetes.io/managed-by: {{ managed_by }}
spec:
  actionType: Create
  kube:
    resource: namespace
    template:
      apiVersion: v1
      kind: Namespace
      metadata:
        name: {{ backup_namespace }}
"#;

const CREATE_SERVICE_ACCOUNT: &str = r#"
apiVersion: action.open-cluster-management.io/v1beta1
kind: ManagedClusterAction
metadata:
  name: {{ resource_name }}
  namespace: {{ cluster_name }}
  labels:
    app.kubernetes.io/managed-by: {{ managed_by }}
spec:
  actionType: Create
  kube:
    resource: serviceaccount
    namespace: {{ backup_namespace }}
    template:
      apiVersion: v1
      kind: ServiceAccount
      metadata:
        name: {{ service_account }}
        namespace: {{ backup_namespace }}
"#;

const CREATE_ROLE_BINDING: &str = r#"
apiVersion: action.open-cluster-management.io/v1beta1
kind: ManagedClusterAction
metadata:
  name: {{ resource_name }}
  namespace: {{ cluster_name }}
  labels:
    app.kubernetes.io/managed-by: {{ managed_by }}
spec:
  actionType: Create
  kube:
    resource: clusterrolebinding
    template:
      apiVersion: rbac.authorization.k8s.io/v1
      kind: ClusterRoleBinding
      metadata:
        name: {{ service_account }}
      roleRef:
        apiGroup: rbac.authorization.k8s.io
        kind: ClusterRole
        name: cluster-admin
      subjects:
        - kind: ServiceAccount
          name: {{ service_account }}
          namespace: {{ backup_namespace }}
"#;

const CREATE_JOB: &str = r#"
apiVersion: action.open-cluster-management.io/v1beta1
kind: ManagedClusterAction
metadata:
  name: {{ resource_name }}
  namespace: {{ cluster_name }}
  labels:
    app.kubernetes.io/managed-by: {{ managed_by }}
spec:
  actionType: Create
  kube:
    resource: job
    namespace: {{ backup_namespace }}
    template:
      apiVersion: batch/v1
      kind: Job
      metadata:
        name: {{ job_name }}
        namespace: {{ backup_namespace }}
      spec:
        backoffLimit: 2
        template:
          spec:
            serviceAccountName: {{ service_account }}
            restartPolicy: Never
            containers:
              - name: backup
                image: {{ backup_image }}
                env:
                  - name: CLUSTER_NAME
                    value: {{ cluster_name | json_encode() }}
                  - name: RECOVERY_PATH
                    value: {{ recovery_path | json_encode() }}
"#;

const VIEW_JOB: &str = r#"
apiVersion: view.open-cluster-management.io/v1beta1
kind: ManagedClusterView
metadata:
  name: {{ resource_name }}
  namespace: {{ cluster_name }}
  labels:
    app.kubernetes.io/managed-by: {{ managed_by }}
spec:
  scope:
    apiGroup: batch
    version: v1
    kind: Job
    resource: jobs
    name: {{ job_name }}
    namespace: {{ backup_namespace }}
"#;

const DELETE_NAMESPACE: &str = r#"
apiVersion: action.open-cluster-management.io/v1beta1
kind: ManagedClusterAction
metadata:
  name: {{ resource_name }}
  namespace: {{ cluster_name }}
  labels:
    app.kubernetes.io/managed-by: {{ managed_by }}
spec:
  actionType: Delete
  kube:
    resource: namespace
    name: {{ backup_namespace }}
"#;

/// Namespace, service account, role binding and job, then the view over the job
pub fn create_sequence() -> Vec<ResourceTemplate> {
    vec![
        ResourceTemplate::new("backup-create-namespace", CREATE_NAMESPACE),
        ResourceTemplate::new("backup-create-serviceaccount", CREATE_SERVICE_ACCOUNT),
        ResourceTemplate::new("backup-create-rolebinding", CREATE_ROLE_BINDING),
        ResourceTemplate::new("backup-create-job", CREATE_JOB),
        ResourceTemplate::new("backup-create-clusterview", VIEW_JOB),
    ]
}

pub fn observe_sequence() -> Vec<ResourceTemplate> {
    vec![ResourceTemplate::new("backup-create-clusterview", VIEW_JOB)]
}

pub fn delete_sequence() -> Vec<ResourceTemplate> {
    vec![ResourceTemplate::new("backup-delete-ns", DELETE_NAMESPACE)]
}
