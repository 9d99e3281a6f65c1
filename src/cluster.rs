// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use std::fmt::Debug;

use async_trait::async_trait;
use gateway_api::{gatewayclasses::GatewayClass, gateways::Gateway};
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{Api, ListParams},
    Client, Resource,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

use crate::{
    common::{format_resource, ResourceKey},
    crd::Consumer,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("{} {0} not found", .0.kind)]
    NotFound(ResourceKey),
    #[error("cluster cache unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}

/// Read-only view over the cluster objects the validators depend on.
#[async_trait]
pub trait ClusterCache: Send + Sync {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, LookupError>;
    /// Consumers across all namespaces.
    async fn list_consumers(&self) -> Result<Vec<Consumer>, LookupError>;
    async fn get_gateway(&self, namespace: &str, name: &str) -> Result<Gateway, LookupError>;
    async fn get_gateway_class(&self, name: &str) -> Result<GatewayClass, LookupError>;
}

#[derive(Clone, TypedBuilder)]
pub struct KubeClusterCache {
    client: Client,
}

impl KubeClusterCache {
    async fn get<K>(api: Api<K>, key: ResourceKey) -> Result<K, LookupError>
    where
        K: Resource + Clone + DeserializeOwned + Debug,
    {
        debug!("get {} {key}", format_resource::<K>());
        api.get(&key.name).await.map_err(|e| Self::classify(e, key))
    }

    fn classify(error: kube::Error, key: ResourceKey) -> LookupError {
        match error {
            kube::Error::Api(response) if response.code == 404 => LookupError::NotFound(key),
            e => {
                warn!("lookup of {} {key} failed {e:?}", key.kind);
                LookupError::Unavailable(e.to_string())
            },
        }
    }
}

#[async_trait]
impl ClusterCache for KubeClusterCache {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, LookupError> {
        Self::get(Api::<Secret>::namespaced(self.client.clone(), namespace), ResourceKey::secret(namespace, name)).await
    }

    async fn list_consumers(&self) -> Result<Vec<Consumer>, LookupError> {
        let api = Api::<Consumer>::all(self.client.clone());
        match api.list(&ListParams::default()).await {
            Ok(list) => Ok(list.items),
            Err(e) => {
                warn!("listing consumers failed {e:?}");
                Err(LookupError::Unavailable(e.to_string()))
            },
        }
    }

    async fn get_gateway(&self, namespace: &str, name: &str) -> Result<Gateway, LookupError> {
        Self::get(Api::<Gateway>::namespaced(self.client.clone(), namespace), ResourceKey::namespaced("Gateway", namespace, name)).await
    }

    async fn get_gateway_class(&self, name: &str) -> Result<GatewayClass, LookupError> {
        Self::get(Api::<GatewayClass>::all(self.client.clone()), ResourceKey::cluster_scoped("GatewayClass", name)).await
    }
}

#[cfg(test)]
mod tests {
    use http::{Request, Response};
    use kube::client::Body;
    use tower_test::mock;

    use super::*;

    fn status_body(code: u16, reason: &str) -> Body {
        let status = serde_json::json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": format!("request failed with {reason}"),
            "reason": reason,
            "code": code,
        });
        Body::from(serde_json::to_vec(&status).unwrap())
    }

    #[tokio::test]
    async fn missing_secret_is_not_found() {
        let (mock_service, mut handle) = mock::pair::<Request<Body>, Response<Body>>();
        let client = Client::new(mock_service, "default");
        let server = tokio::spawn(async move {
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.uri().path(), "/api/v1/namespaces/team-a/secrets/missing");
            send.send_response(Response::builder().status(404).body(status_body(404, "NotFound")).unwrap());
        });

        let cache = KubeClusterCache::builder().client(client).build();
        let result = cache.get_secret("team-a", "missing").await;
        server.await.unwrap();

        assert_eq!(result.unwrap_err(), LookupError::NotFound(ResourceKey::secret("team-a", "missing")));
    }

    #[tokio::test]
    async fn server_errors_are_unavailable() {
        let (mock_service, mut handle) = mock::pair::<Request<Body>, Response<Body>>();
        let client = Client::new(mock_service, "default");
        let server = tokio::spawn(async move {
            let (request, send) = handle.next_request().await.expect("service not called");
            assert!(request.uri().path().ends_with("/gatewayclasses/kubvernor"));
            send.send_response(Response::builder().status(500).body(status_body(500, "InternalError")).unwrap());
        });

        let cache = KubeClusterCache::builder().client(client).build();
        let result = cache.get_gateway_class("kubvernor").await;
        server.await.unwrap();

        let error = result.unwrap_err();
        assert!(!error.is_not_found());
        assert!(matches!(error, LookupError::Unavailable(_)));
    }

    #[tokio::test]
    async fn consumers_are_listed_across_namespaces() {
        let (mock_service, mut handle) = mock::pair::<Request<Body>, Response<Body>>();
        let client = Client::new(mock_service, "default");
        let server = tokio::spawn(async move {
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.uri().path(), "/apis/configuration.kubvernor.io/v1/consumers");
            let list = serde_json::json!({
                "apiVersion": "configuration.kubvernor.io/v1",
                "kind": "ConsumerList",
                "metadata": {},
                "items": [{
                    "apiVersion": "configuration.kubvernor.io/v1",
                    "kind": "Consumer",
                    "metadata": { "name": "alice", "namespace": "team-a" },
                    "spec": { "username": "alice", "credentials": ["alice-key"] }
                }]
            });
            send.send_response(Response::builder().status(200).body(Body::from(serde_json::to_vec(&list).unwrap())).unwrap());
        });

        let cache = KubeClusterCache::builder().client(client).build();
        let consumers = cache.list_consumers().await.unwrap();
        server.await.unwrap();

        assert_eq!(consumers.len(), 1);
        assert_eq!(consumers[0].spec.username, "alice");
        assert!(consumers[0].references_secret("team-a", "alice-key"));
    }
}
