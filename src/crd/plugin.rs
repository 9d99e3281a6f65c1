// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use std::{collections::BTreeMap, fmt::Display};

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "configuration.kubvernor.io", version = "v1", kind = "Plugin", plural = "plugins", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct PluginSpec {
    #[serde(rename = "plugin", default)]
    pub plugin_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_from: Option<ConfigSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<PluginOrdering>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<Protocol>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_ref: Option<String>,
}

/// Cluster wide variant of [`Plugin`]. The secret reference has to carry its own namespace.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "configuration.kubvernor.io", version = "v1", kind = "ClusterPlugin", plural = "clusterplugins")]
#[serde(rename_all = "camelCase")]
pub struct ClusterPluginSpec {
    #[serde(rename = "plugin", default)]
    pub plugin_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_from: Option<NamespacedConfigSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<PluginOrdering>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<Protocol>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_ref: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSource {
    pub secret_key_ref: SecretValueFromSource,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct SecretValueFromSource {
    pub name: String,
    pub key: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NamespacedConfigSource {
    pub secret_key_ref: NamespacedSecretValueFromSource,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct NamespacedSecretValueFromSource {
    pub namespace: String,
    pub name: String,
    pub key: String,
}

/// Phase ordering constraints, keyed by phase name (e.g. `access`) and listing plugin names.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct PluginOrdering {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub before: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub after: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Http,
    Https,
    Grpc,
    Grpcs,
    Tcp,
    Tls,
    TlsPassthrough,
    Udp,
    Ws,
    Wss,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Grpc => "grpc",
            Protocol::Grpcs => "grpcs",
            Protocol::Tcp => "tcp",
            Protocol::Tls => "tls",
            Protocol::TlsPassthrough => "tls_passthrough",
            Protocol::Udp => "udp",
            Protocol::Ws => "ws",
            Protocol::Wss => "wss",
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ClusterPlugin> for Plugin {
    fn from(cluster_plugin: &ClusterPlugin) -> Self {
        let spec = &cluster_plugin.spec;
        let config_from = spec.config_from.as_ref().map(|source| ConfigSource {
            secret_key_ref: SecretValueFromSource { name: source.secret_key_ref.name.clone(), key: source.secret_key_ref.key.clone() },
        });
        let namespace = spec
            .config_from
            .as_ref()
            .map(|source| source.secret_key_ref.namespace.as_str())
            .filter(|namespace| !namespace.is_empty())
            .unwrap_or(crate::common::DEFAULT_NAMESPACE_NAME)
            .to_owned();

        let mut plugin = Plugin::new(
            &kube::ResourceExt::name_any(cluster_plugin),
            PluginSpec {
                plugin_name: spec.plugin_name.clone(),
                config: spec.config.clone(),
                config_from,
                run_on: spec.run_on.clone(),
                ordering: spec.ordering.clone(),
                protocols: spec.protocols.clone(),
                disabled: spec.disabled,
                consumer_ref: spec.consumer_ref.clone(),
            },
        );
        plugin.metadata = cluster_plugin.metadata.clone();
        plugin.metadata.namespace = Some(namespace);
        plugin
    }
}
