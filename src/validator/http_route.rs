// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use gateway_api::httproutes::HTTPRoute;
use itertools::Itertools;
use tracing::debug;

use super::AdminApiValidator;
use crate::{
    common::{ResourceKey, DEFAULT_NAMESPACE_NAME},
    route_validation::validate_http_route,
    verdict::{Step, Verdict},
};

impl AdminApiValidator {
    /// A parent reference which cannot be resolved rejects the route, even when other parents resolve.
    pub(super) async fn http_route_steps(&self, route: &HTTPRoute) -> Step {
        let route_namespace = route.metadata.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE_NAME);

        let mut managed_gateways = vec![];
        for parent_ref in route.spec.parent_refs.iter().flatten() {
            let namespace = parent_ref.namespace.as_deref().unwrap_or(route_namespace);
            let gateway = self.cache.get_gateway(namespace, &parent_ref.name).await.map_err(|e| {
                debug!("route {} references gateway {namespace}/{} {e}", ResourceKey::from(route), parent_ref.name);
                Verdict::rejected(format!("couldn't retrieve referenced gateway {namespace}/{}", parent_ref.name))
            })?;

            let class_name = &gateway.spec.gateway_class_name;
            let gateway_class = self.cache.get_gateway_class(class_name).await.map_err(|e| {
                debug!("gateway {namespace}/{} references gatewayclass {class_name} {e}", parent_ref.name);
                Verdict::rejected(format!("couldn't retrieve referenced gatewayclass {class_name}"))
            })?;

            if gateway_class.spec.controller_name == self.controller_name {
                managed_gateways.push(gateway);
            }
        }

        if managed_gateways.is_empty() {
            return Ok(());
        }
        debug!("route {} attaches to managed gateways {}", ResourceKey::from(route), managed_gateways.iter().map(ResourceKey::from).join(", "));

        match validate_http_route(route, &managed_gateways) {
            Verdict::Accepted => Ok(()),
            verdict => Err(verdict),
        }
    }
}
