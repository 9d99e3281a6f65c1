// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
//! Structural checks of an HTTPRoute against the managed gateways it attaches to.

use eater_domainmatcher::DomainPattern;
use gateway_api::{
    common::ParentReference,
    gateways::{Gateway, GatewayListeners},
    httproutes::HTTPRoute,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    common::{ResourceKey, DEFAULT_NAMESPACE_NAME},
    verdict::Verdict,
};

const DEFAULT_ROUTE_HOSTNAME: &str = "*";
const HTTP_PROTOCOLS: [&str; 2] = ["HTTP", "HTTPS"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteValidationError {
    #[error("gateway {gateway} has no listener named {section_name}")]
    NoSuchListener { gateway: ResourceKey, section_name: String },
    #[error("gateway {gateway} has no listener on port {port}")]
    NoListenerOnPort { gateway: ResourceKey, port: i32 },
    #[error("gateway {gateway} has no listener named {section_name} on port {port}")]
    NoSuchListenerOnPort { gateway: ResourceKey, section_name: String, port: i32 },
    #[error("gateway {gateway} has no HTTP or HTTPS listener the route can attach to")]
    NoHttpListener { gateway: ResourceKey },
    #[error("no listener hostname of gateway {gateway} matches the route hostnames")]
    NoMatchingHostname { gateway: ResourceKey },
}

pub struct HostnameMatchFilter<'a> {
    listener_hostname: &'a str,
    route_hostnames: &'a [String],
}

impl<'a> HostnameMatchFilter<'a> {
    pub fn new(listener_hostname: &'a str, route_hostnames: &'a [String]) -> Self {
        Self { listener_hostname, route_hostnames }
    }

    pub fn filter(&self) -> bool {
        if self.route_hostnames.is_empty() || self.listener_hostname.is_empty() {
            return true;
        }

        if self.route_hostnames.iter().any(|hostname| hostname == DEFAULT_ROUTE_HOSTNAME) {
            return true;
        }

        let pattern = match self.listener_hostname.strip_prefix("*.") {
            Some(stripped) => format!("**+.{stripped}"),
            None => self.listener_hostname.to_owned(),
        };

        let Ok(pattern) = DomainPattern::<'_, '.'>::try_from(pattern.as_str()) else {
            warn!("Hostname is not a valid domain {}", self.listener_hostname);
            return false;
        };

        if self.route_hostnames.iter().any(|route_hostname| {
            let res = pattern.matches(route_hostname);
            debug!("Comparing hostnames {} {} {}", self.listener_hostname, route_hostname, res);
            res
        }) {
            return true;
        }

        self.route_hostnames
            .iter()
            .filter(|route_hostname| route_hostname.starts_with("*."))
            .filter_map(|wildcarded| DomainPattern::<'_, '.'>::try_from(wildcarded.as_str()).ok())
            .any(|wildcarded| wildcarded.matches(self.listener_hostname))
    }
}

fn targets(parent_ref: &ParentReference, route_namespace: &str, gateway: &ResourceKey) -> bool {
    parent_ref.name == gateway.name && parent_ref.namespace.as_deref().unwrap_or(route_namespace) == gateway.namespace
}

fn selected_listeners<'a>(parent_ref: &ParentReference, gateway: &'a Gateway) -> impl Iterator<Item = &'a GatewayListeners> {
    let section_name = parent_ref.section_name.clone();
    let port = parent_ref.port;
    gateway
        .spec
        .listeners
        .iter()
        .filter(move |listener| section_name.as_ref().map_or(true, |name| listener.name == *name))
        .filter(move |listener| port.map_or(true, |port| listener.port == port))
}

fn validate_parent(parent_ref: &ParentReference, gateway: &Gateway, route_hostnames: &[String]) -> Result<(), RouteValidationError> {
    let gateway_key = ResourceKey::from(gateway);

    let listeners: Vec<&GatewayListeners> = selected_listeners(parent_ref, gateway).collect();
    if listeners.is_empty() {
        match (parent_ref.section_name.clone(), parent_ref.port) {
            (Some(section_name), Some(port)) => return Err(RouteValidationError::NoSuchListenerOnPort { gateway: gateway_key, section_name, port }),
            (Some(section_name), None) => return Err(RouteValidationError::NoSuchListener { gateway: gateway_key, section_name }),
            (None, Some(port)) => return Err(RouteValidationError::NoListenerOnPort { gateway: gateway_key, port }),
            (None, None) => {},
        }
    }

    let listeners: Vec<&GatewayListeners> =
        listeners.into_iter().filter(|listener| HTTP_PROTOCOLS.iter().any(|protocol| listener.protocol.eq_ignore_ascii_case(protocol))).collect();
    if listeners.is_empty() {
        return Err(RouteValidationError::NoHttpListener { gateway: gateway_key });
    }

    let hostname_matches =
        listeners.iter().any(|listener| HostnameMatchFilter::new(listener.hostname.as_deref().unwrap_or_default(), route_hostnames).filter());
    if !hostname_matches {
        return Err(RouteValidationError::NoMatchingHostname { gateway: gateway_key });
    }
    Ok(())
}

/// Checks every parent reference of `route` which targets one of `managed_gateways`.
pub fn validate_http_route(route: &HTTPRoute, managed_gateways: &[Gateway]) -> Verdict {
    let route_namespace = route.metadata.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE_NAME);
    let route_hostnames = route.spec.hostnames.clone().unwrap_or_default();

    for parent_ref in route.spec.parent_refs.iter().flatten() {
        for gateway in managed_gateways {
            if !targets(parent_ref, route_namespace, &ResourceKey::from(gateway)) {
                continue;
            }
            if let Err(e) = validate_parent(parent_ref, gateway, &route_hostnames) {
                debug!("route {} rejected {e}", ResourceKey::from(route));
                return Verdict::rejected(e.to_string());
            }
        }
    }
    Verdict::Accepted
}
