// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use gateway_api::{gatewayclasses::GatewayClass, gateways::Gateway};
use k8s_openapi::api::core::v1::Secret;

use crate::{
    cluster::{ClusterCache, LookupError},
    common::ResourceKey,
    crd::Consumer,
};

#[derive(thiserror::Error, Debug, PartialEq, PartialOrd)]
pub enum StorageError {
    LockingError,
}
impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<StorageError> for LookupError {
    fn from(value: StorageError) -> Self {
        LookupError::Unavailable(value.to_string())
    }
}

/// In-memory snapshot of the cluster objects, usable as a [`ClusterCache`].
#[derive(Clone, Default)]
pub struct ClusterState {
    secrets: Arc<Mutex<HashMap<ResourceKey, Arc<Secret>>>>,
    consumers: Arc<Mutex<HashMap<ResourceKey, Arc<Consumer>>>>,
    gateways: Arc<Mutex<HashMap<ResourceKey, Arc<Gateway>>>>,
    gateway_classes: Arc<Mutex<HashMap<ResourceKey, Arc<GatewayClass>>>>,
}

impl ClusterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_secret(&self, secret: Secret) -> Result<(), StorageError> {
        let mut lock = self.secrets.lock().map_err(|_| StorageError::LockingError)?;
        lock.insert(ResourceKey::from(&secret), Arc::new(secret));
        Ok(())
    }

    pub fn delete_secret(&self, id: &ResourceKey) -> Result<Option<Arc<Secret>>, StorageError> {
        let mut lock = self.secrets.lock().map_err(|_| StorageError::LockingError)?;
        Ok(lock.remove(id))
    }

    pub fn save_consumer(&self, consumer: Consumer) -> Result<(), StorageError> {
        let mut lock = self.consumers.lock().map_err(|_| StorageError::LockingError)?;
        lock.insert(ResourceKey::from(&consumer), Arc::new(consumer));
        Ok(())
    }

    pub fn save_gateway(&self, gateway: Gateway) -> Result<(), StorageError> {
        let mut lock = self.gateways.lock().map_err(|_| StorageError::LockingError)?;
        lock.insert(ResourceKey::from(&gateway), Arc::new(gateway));
        Ok(())
    }

    pub fn save_gateway_class(&self, gateway_class: GatewayClass) -> Result<(), StorageError> {
        let mut lock = self.gateway_classes.lock().map_err(|_| StorageError::LockingError)?;
        lock.insert(ResourceKey::from(&gateway_class), Arc::new(gateway_class));
        Ok(())
    }
}

#[async_trait]
impl ClusterCache for ClusterState {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, LookupError> {
        let key = ResourceKey::secret(namespace, name);
        let lock = self.secrets.lock().map_err(|_| StorageError::LockingError)?;
        lock.get(&key).map(|secret| (**secret).clone()).ok_or(LookupError::NotFound(key))
    }

    async fn list_consumers(&self) -> Result<Vec<Consumer>, LookupError> {
        let lock = self.consumers.lock().map_err(|_| StorageError::LockingError)?;
        let mut consumers: Vec<(&ResourceKey, &Arc<Consumer>)> = lock.iter().collect();
        consumers.sort_by(|(this, _), (other, _)| this.cmp(other));
        Ok(consumers.into_iter().map(|(_, consumer)| (**consumer).clone()).collect())
    }

    async fn get_gateway(&self, namespace: &str, name: &str) -> Result<Gateway, LookupError> {
        let key = ResourceKey::namespaced("Gateway", namespace, name);
        let lock = self.gateways.lock().map_err(|_| StorageError::LockingError)?;
        lock.get(&key).map(|gateway| (**gateway).clone()).ok_or(LookupError::NotFound(key))
    }

    async fn get_gateway_class(&self, name: &str) -> Result<GatewayClass, LookupError> {
        let key = ResourceKey::cluster_scoped("GatewayClass", name);
        let lock = self.gateway_classes.lock().map_err(|_| StorageError::LockingError)?;
        lock.get(&key).map(|gateway_class| (**gateway_class).clone()).ok_or(LookupError::NotFound(key))
    }
}
