// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
//! Admission validation of gateway configuration objects.
//!
//! Every validator is a sequence of guard steps. A step either lets the validation continue or ends it
//! with a [`Verdict`], so cheap local checks always run before cluster lookups and Admin API calls.

mod consumer;
mod consumer_group;
mod credential;
mod gateway;
mod http_route;
mod plugin;

use std::sync::Arc;

use async_trait::async_trait;
use gateway_api::{gateways::Gateway, httproutes::HTTPRoute};
use k8s_openapi::api::core::v1::Secret;
use kube::api::ObjectMeta;
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::{
    admin_api::AdminApiServicesProvider,
    cluster::ClusterCache,
    configuration::{Configuration, ConfigurationError},
    crd::{ClusterPlugin, Consumer, ConsumerGroup, Plugin},
    membership::IngressClassMatcher,
    verdict::{conclude, Step, Verdict},
};

pub const REASON_CONSUMER_USERNAME_EMPTY: &str = "consumer username cannot be empty";
pub const REASON_CONSUMER_EXISTS: &str = "consumer already exists";
pub const REASON_CONSUMER_UNRETRIEVABLE: &str = "failed to fetch consumer";
pub const REASON_CONSUMER_CREDENTIAL_SECRET_NOT_FOUND: &str = "consumer referenced non-existent credentials secret";
pub const REASON_FAILED_TO_RETRIEVE_SECRET: &str = "failed to retrieve credentials secret";
pub const REASON_CONSUMER_CREDENTIAL_VALIDATION_FAILED: &str = "consumer credential failed validation";
pub const REASON_ADMIN_API_UNAVAILABLE: &str = "admin API is unavailable";
pub const REASON_CONSUMER_GROUP_UNSUPPORTED: &str = "consumer groups are only supported by enterprise gateways 3.4 and above";
pub const REASON_CONSUMER_GROUP_UNLICENSED: &str = "consumer groups require a valid enterprise license";
pub const REASON_CONSUMER_GROUP_UNEXPECTED: &str = "unexpected error while checking consumer groups support";
pub const REASON_PLUGIN_NAME_EMPTY: &str = "plugin name cannot be empty";
pub const REASON_PLUGIN_CONFIG_INVALID: &str = "could not parse plugin configuration";
pub const REASON_PLUGIN_USES_BOTH_CONFIG_TYPES: &str = "plugin cannot use both Config and ConfigFrom";
pub const REASON_PLUGIN_SECRET_CONFIG_UNRETRIEVABLE: &str = "could not retrieve plugin configuration from secret";
pub const REASON_PLUGIN_SCHEMA_VIOLATION: &str = "plugin failed schema validation";
pub const REASON_PLUGIN_SCHEMA_VALIDATION_FAILED: &str = "unable to validate plugin against the gateway schema";
pub const REASON_GATEWAY_CLASS_UNRETRIEVABLE: &str = "unable to retrieve referenced gatewayclass";

/// Validation entry points, one per admitted kind.
#[async_trait]
pub trait AdmissionValidator: Send + Sync {
    async fn validate_consumer(&self, consumer: &Consumer) -> Verdict;
    async fn validate_consumer_group(&self, consumer_group: &ConsumerGroup) -> Verdict;
    async fn validate_plugin(&self, plugin: &Plugin) -> Verdict;
    async fn validate_cluster_plugin(&self, cluster_plugin: &ClusterPlugin) -> Verdict;
    async fn validate_credential(&self, secret: &Secret) -> Verdict;
    async fn validate_gateway(&self, gateway: &Gateway) -> Verdict;
    async fn validate_http_route(&self, route: &HTTPRoute) -> Verdict;
}

/// Validator backed by the cluster cache and whatever the Admin API offers.
///
/// Holds only shared handles, so one instance can serve concurrent admission requests.
#[derive(Clone, TypedBuilder)]
pub struct AdminApiValidator {
    cache: Arc<dyn ClusterCache>,
    services: Arc<dyn AdminApiServicesProvider>,
    matcher: IngressClassMatcher,
    #[builder(setter(into))]
    controller_name: String,
}

impl AdminApiValidator {
    pub fn from_configuration(
        configuration: &Configuration,
        cache: Arc<dyn ClusterCache>,
        services: Arc<dyn AdminApiServicesProvider>,
    ) -> Result<Self, ConfigurationError> {
        configuration.validate()?;
        Ok(Self::builder()
            .cache(cache)
            .services(services)
            .matcher(configuration.ingress_class_matcher())
            .controller_name(configuration.controller_name.clone())
            .build())
    }

    /// Objects carrying another ingress class are accepted without looking at their content.
    fn ensure_managed(&self, meta: &ObjectMeta) -> Step {
        if self.matcher.is_managed(meta) {
            Ok(())
        } else {
            debug!("{} is not managed by ingress class {}", meta.name.as_deref().unwrap_or_default(), self.matcher.ingress_class());
            Err(Verdict::Accepted)
        }
    }

    async fn list_managed_consumers(&self) -> Step<Vec<Consumer>> {
        let consumers = self.cache.list_consumers().await.map_err(|e| Verdict::failed(REASON_CONSUMER_UNRETRIEVABLE, e))?;
        Ok(consumers.into_iter().filter(|consumer| self.matcher.is_managed(&consumer.metadata)).collect())
    }
}

#[async_trait]
impl AdmissionValidator for AdminApiValidator {
    async fn validate_consumer(&self, consumer: &Consumer) -> Verdict {
        conclude(self.consumer_steps(consumer).await)
    }

    async fn validate_consumer_group(&self, consumer_group: &ConsumerGroup) -> Verdict {
        conclude(self.consumer_group_steps(consumer_group).await)
    }

    async fn validate_plugin(&self, plugin: &Plugin) -> Verdict {
        conclude(self.plugin_steps(plugin).await)
    }

    async fn validate_cluster_plugin(&self, cluster_plugin: &ClusterPlugin) -> Verdict {
        conclude(self.plugin_steps(&Plugin::from(cluster_plugin)).await)
    }

    async fn validate_credential(&self, secret: &Secret) -> Verdict {
        conclude(self.credential_steps(secret).await)
    }

    async fn validate_gateway(&self, gateway: &Gateway) -> Verdict {
        conclude(self.gateway_steps(gateway).await)
    }

    async fn validate_http_route(&self, route: &HTTPRoute) -> Verdict {
        conclude(self.http_route_steps(route).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        admin_api::StaticServicesProvider,
        common::test::{consumer, TEST_CONTROLLER_NAME, TEST_INGRESS_CLASS},
        membership::ClassMatching,
        state::ClusterState,
    };

    #[test]
    fn built_from_configuration() {
        let configuration = Configuration::builder().controller_name(TEST_CONTROLLER_NAME).ingress_class(TEST_INGRESS_CLASS).build();
        let validator =
            AdminApiValidator::from_configuration(&configuration, Arc::new(ClusterState::new()), Arc::new(StaticServicesProvider::unavailable()))
                .unwrap();
        assert_eq!(validator.controller_name, TEST_CONTROLLER_NAME);
        assert_eq!(validator.matcher.ingress_class(), TEST_INGRESS_CLASS);

        let configuration = Configuration::builder().controller_name("").ingress_class(TEST_INGRESS_CLASS).build();
        assert!(AdminApiValidator::from_configuration(&configuration, Arc::new(ClusterState::new()), Arc::new(StaticServicesProvider::unavailable()))
            .is_err());
    }

    #[tokio::test]
    async fn only_managed_consumers_are_listed() {
        let state = ClusterState::new();
        state.save_consumer(consumer("team-a", "alice", Some(TEST_INGRESS_CLASS), "alice", &[])).unwrap();
        state.save_consumer(consumer("team-a", "bob", Some("other"), "bob", &[])).unwrap();
        state.save_consumer(consumer("team-b", "carol", None, "carol", &[])).unwrap();

        let validator = AdminApiValidator::builder()
            .cache(Arc::new(state.clone()))
            .services(Arc::new(StaticServicesProvider::unavailable()))
            .matcher(IngressClassMatcher::new(TEST_INGRESS_CLASS, ClassMatching::Exact))
            .controller_name(TEST_CONTROLLER_NAME)
            .build();
        let usernames: Vec<String> = validator.list_managed_consumers().await.unwrap().into_iter().map(|c| c.spec.username).collect();
        assert_eq!(usernames, vec!["alice".to_owned()]);

        let validator = AdminApiValidator::builder()
            .cache(Arc::new(state))
            .services(Arc::new(StaticServicesProvider::unavailable()))
            .matcher(IngressClassMatcher::new(TEST_INGRESS_CLASS, ClassMatching::ExactOrEmpty))
            .controller_name(TEST_CONTROLLER_NAME)
            .build();
        assert_eq!(validator.list_managed_consumers().await.unwrap().len(), 2);
    }
}
