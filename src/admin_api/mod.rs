// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
//! Capabilities of the remote gateway Admin API.
//!
//! Each capability is optional. A provider returning `None` means the connected control plane
//! (or the lack of one) does not offer it, and validators skip the checks gated on it.

mod version;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typed_builder::TypedBuilder;
pub use version::{GatewayVersion, VersionError, CONSUMER_GROUPS_VERSION_CUTOFF};

use crate::plugin_config::PluginConfiguration;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminApiError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("{message}")]
    Unexpected { status: Option<u16>, message: String },
}

impl AdminApiError {
    /// Classifies an HTTP status returned by the Admin API.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => AdminApiError::NotFound(message),
            403 => AdminApiError::Forbidden(message),
            status => AdminApiError::Unexpected { status: Some(status), message },
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        AdminApiError::Unexpected { status: None, message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AdminApiError::NotFound(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, AdminApiError::Forbidden(_))
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RemoteConsumer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RemoteConsumerGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GatewayInfo {
    pub version: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaValidation {
    Valid,
    Invalid(String),
}

#[async_trait]
pub trait ConsumerService: Send + Sync {
    async fn get(&self, username_or_id: &str) -> Result<RemoteConsumer, AdminApiError>;
}

#[async_trait]
pub trait PluginService: Send + Sync {
    async fn validate(&self, plugin: &PluginConfiguration) -> Result<SchemaValidation, AdminApiError>;
}

#[async_trait]
pub trait ConsumerGroupService: Send + Sync {
    async fn list(&self, options: &ListOptions) -> Result<Vec<RemoteConsumerGroup>, AdminApiError>;
}

#[async_trait]
pub trait InfoService: Send + Sync {
    async fn get(&self) -> Result<GatewayInfo, AdminApiError>;
}

pub trait AdminApiServicesProvider: Send + Sync {
    fn consumers_service(&self) -> Option<Arc<dyn ConsumerService>>;
    fn plugins_service(&self) -> Option<Arc<dyn PluginService>>;
    fn consumer_groups_service(&self) -> Option<Arc<dyn ConsumerGroupService>>;
    fn info_service(&self) -> Option<Arc<dyn InfoService>>;
}

/// Provider over a fixed set of services. Services left unset are reported as unavailable.
#[derive(Clone, Default, TypedBuilder)]
pub struct StaticServicesProvider {
    #[builder(default, setter(strip_option))]
    consumers: Option<Arc<dyn ConsumerService>>,
    #[builder(default, setter(strip_option))]
    plugins: Option<Arc<dyn PluginService>>,
    #[builder(default, setter(strip_option))]
    consumer_groups: Option<Arc<dyn ConsumerGroupService>>,
    #[builder(default, setter(strip_option))]
    info: Option<Arc<dyn InfoService>>,
}

impl StaticServicesProvider {
    /// A provider for deployments without a reachable Admin API.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl AdminApiServicesProvider for StaticServicesProvider {
    fn consumers_service(&self) -> Option<Arc<dyn ConsumerService>> {
        self.consumers.clone()
    }

    fn plugins_service(&self) -> Option<Arc<dyn PluginService>> {
        self.plugins.clone()
    }

    fn consumer_groups_service(&self) -> Option<Arc<dyn ConsumerGroupService>> {
        self.consumer_groups.clone()
    }

    fn info_service(&self) -> Option<Arc<dyn InfoService>> {
        self.info.clone()
    }
}
