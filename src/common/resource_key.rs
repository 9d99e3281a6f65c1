// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use std::fmt::Display;

use gateway_api::{gatewayclasses::GatewayClass, gateways::Gateway, httproutes::HTTPRoute};
use k8s_openapi::api::core::v1::Secret;
use kube::{Resource, ResourceExt};

use crate::crd::{ClusterPlugin, Consumer, ConsumerGroup, Plugin};

pub const DEFAULT_NAMESPACE_NAME: &str = "default";

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
    pub kind: String,
}

impl ResourceKey {
    pub fn namespaced(kind: &str, namespace: &str, name: &str) -> Self {
        Self { kind: kind.to_owned(), namespace: namespace.to_owned(), name: name.to_owned() }
    }

    pub fn cluster_scoped(kind: &str, name: &str) -> Self {
        Self { kind: kind.to_owned(), namespace: String::new(), name: name.to_owned() }
    }

    pub fn secret(namespace: &str, name: &str) -> Self {
        Self::namespaced("Secret", namespace, name)
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

fn namespace_of<R: Resource>(resource: &R) -> String {
    resource.meta().namespace.clone().unwrap_or(DEFAULT_NAMESPACE_NAME.to_owned())
}

impl From<&Secret> for ResourceKey {
    fn from(value: &Secret) -> Self {
        Self { kind: "Secret".to_owned(), namespace: namespace_of(value), name: value.name_any() }
    }
}

impl From<&Consumer> for ResourceKey {
    fn from(value: &Consumer) -> Self {
        Self { kind: "Consumer".to_owned(), namespace: namespace_of(value), name: value.name_any() }
    }
}

impl From<&ConsumerGroup> for ResourceKey {
    fn from(value: &ConsumerGroup) -> Self {
        Self { kind: "ConsumerGroup".to_owned(), namespace: namespace_of(value), name: value.name_any() }
    }
}

impl From<&Plugin> for ResourceKey {
    fn from(value: &Plugin) -> Self {
        Self { kind: "Plugin".to_owned(), namespace: namespace_of(value), name: value.name_any() }
    }
}

impl From<&ClusterPlugin> for ResourceKey {
    fn from(value: &ClusterPlugin) -> Self {
        Self::cluster_scoped("ClusterPlugin", &value.name_any())
    }
}

impl From<&GatewayClass> for ResourceKey {
    fn from(value: &GatewayClass) -> Self {
        Self::cluster_scoped("GatewayClass", &value.name_any())
    }
}

impl From<&Gateway> for ResourceKey {
    fn from(value: &Gateway) -> Self {
        Self { kind: "Gateway".to_owned(), namespace: namespace_of(value), name: value.name_any() }
    }
}

impl From<&HTTPRoute> for ResourceKey {
    fn from(value: &HTTPRoute) -> Self {
        Self { kind: "HTTPRoute".to_owned(), namespace: namespace_of(value), name: value.name_any() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_omits_empty_namespace() {
        assert_eq!(ResourceKey::secret("team-a", "s1").to_string(), "team-a/s1");
        assert_eq!(ResourceKey::cluster_scoped("GatewayClass", "kubvernor").to_string(), "kubvernor");
    }

    #[test]
    fn secrets_without_namespace_land_in_default() {
        let secret: Secret = serde_yaml::from_str(
            r"
apiVersion: v1
kind: Secret
metadata:
  name: creds
",
        )
        .unwrap();
        assert_eq!(ResourceKey::from(&secret), ResourceKey::secret(DEFAULT_NAMESPACE_NAME, "creds"));
    }
}
