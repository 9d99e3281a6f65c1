// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use tracing::{debug, info};

use super::{
    AdminApiValidator, REASON_ADMIN_API_UNAVAILABLE, REASON_CONSUMER_GROUP_UNEXPECTED, REASON_CONSUMER_GROUP_UNLICENSED,
    REASON_CONSUMER_GROUP_UNSUPPORTED,
};
use crate::{
    admin_api::{GatewayVersion, ListOptions},
    crd::ConsumerGroup,
    verdict::{Step, Verdict},
};

impl AdminApiValidator {
    /// Consumer groups need a licensed enterprise gateway of version 3.4 or newer.
    ///
    /// The reported version rules out gateways which are too old. Only an actual call to the consumer
    /// groups endpoint tells whether a license is present, so a successful probe has the last word.
    pub(super) async fn consumer_group_steps(&self, consumer_group: &ConsumerGroup) -> Step {
        self.ensure_managed(&consumer_group.metadata)?;

        let Some(info_service) = self.services.info_service() else {
            return Ok(());
        };
        let info = info_service.get().await.map_err(|e| {
            debug!("failed to fetch gateway info {e}");
            Verdict::rejected(REASON_ADMIN_API_UNAVAILABLE)
        })?;

        match GatewayVersion::parse(&info.version) {
            Ok(version) if !version.supports_consumer_groups() => {
                info!("gateway {version} does not support consumer groups");
                return Err(Verdict::rejected(REASON_CONSUMER_GROUP_UNSUPPORTED));
            },
            Ok(_) => (),
            Err(e) => debug!("failed to parse gateway version {e}"),
        }

        let Some(consumer_groups) = self.services.consumer_groups_service() else {
            return Ok(());
        };
        match consumer_groups.list(&ListOptions { size: 0 }).await {
            Ok(_) => Ok(()),
            // Open source gateways whose version could not be parsed end up here.
            Err(e) if e.is_not_found() => Err(Verdict::rejected(REASON_CONSUMER_GROUP_UNSUPPORTED)),
            Err(e) if e.is_forbidden() => Err(Verdict::rejected(REASON_CONSUMER_GROUP_UNLICENSED)),
            Err(e) => Err(Verdict::rejected(format!("{REASON_CONSUMER_GROUP_UNEXPECTED}: {e}"))),
        }
    }
}
