// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use tracing::{debug, warn};

use super::{
    AdminApiValidator, REASON_PLUGIN_CONFIG_INVALID, REASON_PLUGIN_NAME_EMPTY, REASON_PLUGIN_SCHEMA_VALIDATION_FAILED,
    REASON_PLUGIN_SCHEMA_VIOLATION, REASON_PLUGIN_SECRET_CONFIG_UNRETRIEVABLE, REASON_PLUGIN_USES_BOTH_CONFIG_TYPES,
};
use crate::{
    admin_api::SchemaValidation,
    common::DEFAULT_NAMESPACE_NAME,
    crd::Plugin,
    plugin_config::{raw_config_to_configuration, secret_to_configuration, PluginConfigError, PluginConfiguration},
    verdict::{Step, Verdict},
};

impl AdminApiValidator {
    pub(super) async fn plugin_steps(&self, plugin: &Plugin) -> Step {
        let spec = &plugin.spec;
        if spec.plugin_name.is_empty() {
            return Err(Verdict::rejected(REASON_PLUGIN_NAME_EMPTY));
        }

        let mut config = raw_config_to_configuration(spec.config.as_ref()).map_err(|e| Verdict::rejected(format!("{REASON_PLUGIN_CONFIG_INVALID}: {e}")))?;

        if let Some(config_from) = &spec.config_from {
            if !config.is_empty() {
                return Err(Verdict::rejected(REASON_PLUGIN_USES_BOTH_CONFIG_TYPES));
            }
            let namespace = plugin.metadata.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE_NAME);
            config = secret_to_configuration(self.cache.as_ref(), &config_from.secret_key_ref, namespace).await.map_err(|e| match e {
                PluginConfigError::Lookup(lookup) if !lookup.is_not_found() => Verdict::failed(REASON_PLUGIN_SECRET_CONFIG_UNRETRIEVABLE, lookup),
                e => Verdict::rejected(format!("{REASON_PLUGIN_SECRET_CONFIG_UNRETRIEVABLE}: {e}")),
            })?;
        }

        let configuration = PluginConfiguration::new(spec, config);

        let Some(plugins) = self.services.plugins_service() else {
            debug!("no plugin schema validation available for {}", configuration.name);
            return Ok(());
        };
        match plugins.validate(&configuration).await {
            Ok(SchemaValidation::Valid) => Ok(()),
            Ok(SchemaValidation::Invalid(message)) => Err(Verdict::rejected(format!("{REASON_PLUGIN_SCHEMA_VIOLATION}: {message}"))),
            Err(e) => {
                warn!("schema validation of plugin {} failed {e}", configuration.name);
                Err(Verdict::failed(REASON_PLUGIN_SCHEMA_VALIDATION_FAILED, e))
            },
        }
    }
}
