// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::DEFAULT_NAMESPACE_NAME;

/// A consumer of the gateway. `credentials` names secrets in the consumer's namespace.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "configuration.kubvernor.io", version = "v1", kind = "Consumer", plural = "consumers", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerSpec {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumer_groups: Vec<String>,
}

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "configuration.kubvernor.io", version = "v1", kind = "ConsumerGroup", plural = "consumergroups", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerGroupSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Consumer {
    pub fn references_secret(&self, namespace: &str, name: &str) -> bool {
        self.metadata.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE_NAME) == namespace && self.spec.credentials.iter().any(|c| c == name)
    }
}
