// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
//! Translation of plugin resources into the configuration sent to the Admin API.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::{
    cluster::{ClusterCache, LookupError},
    common::ResourceKey,
    crd::{PluginOrdering, PluginSpec, SecretValueFromSource},
};

pub type Configuration = Map<String, Value>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginConfigError {
    #[error("plugin configuration must be an object, got {0}")]
    NotAnObject(&'static str),
    #[error("secret {secret} has no key {key}")]
    MissingKey { secret: ResourceKey, key: String },
    #[error("key {key} of secret {secret} is neither JSON nor YAML: {message}")]
    Unparsable { secret: ResourceKey, key: String, message: String },
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn into_object(value: Value) -> Result<Configuration, PluginConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Configuration::new()),
        other => Err(PluginConfigError::NotAnObject(kind_of(&other))),
    }
}

/// Inline configuration. A missing or null configuration is empty.
pub fn raw_config_to_configuration(raw: Option<&Value>) -> Result<Configuration, PluginConfigError> {
    raw.cloned().map_or(Ok(Configuration::new()), into_object)
}

/// Configuration stored under a key of a secret in `namespace`. JSON is tried first, then YAML.
pub async fn secret_to_configuration(
    cache: &dyn ClusterCache,
    source: &SecretValueFromSource,
    namespace: &str,
) -> Result<Configuration, PluginConfigError> {
    let secret_key = ResourceKey::secret(namespace, &source.name);
    let secret = cache.get_secret(namespace, &source.name).await?;

    let raw = secret
        .data
        .as_ref()
        .and_then(|data| data.get(&source.key))
        .map(|bytes| bytes.0.clone())
        .or_else(|| secret.string_data.as_ref().and_then(|data| data.get(&source.key)).map(|s| s.as_bytes().to_vec()))
        .ok_or_else(|| PluginConfigError::MissingKey { secret: secret_key.clone(), key: source.key.clone() })?;

    let value = match serde_json::from_slice::<Value>(&raw) {
        Ok(value) => value,
        Err(json_error) => {
            debug!("configuration in {secret_key} is not JSON {json_error}, trying YAML");
            serde_yaml::from_slice::<Value>(&raw).map_err(|e| PluginConfigError::Unparsable {
                secret: secret_key.clone(),
                key: source.key.clone(),
                message: e.to_string(),
            })?
        },
    };
    into_object(value)
}

/// Plugin in the shape the Admin API schema validation endpoint expects.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct PluginConfiguration {
    pub name: String,
    pub config: Configuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<PluginOrdering>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
}

impl PluginConfiguration {
    /// Copies the remaining plugin settings over an already resolved configuration.
    pub fn new(spec: &PluginSpec, config: Configuration) -> Self {
        Self {
            name: spec.plugin_name.clone(),
            config,
            run_on: spec.run_on.clone().filter(|run_on| !run_on.is_empty()),
            ordering: spec.ordering.clone(),
            protocols: if spec.protocols.is_empty() {
                None
            } else {
                Some(spec.protocols.iter().map(|protocol| protocol.as_str().to_owned()).collect())
            },
        }
    }
}
