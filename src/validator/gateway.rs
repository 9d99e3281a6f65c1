// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use gateway_api::gateways::Gateway;
use tracing::debug;

use super::{AdminApiValidator, REASON_GATEWAY_CLASS_UNRETRIEVABLE};
use crate::{
    common::ResourceKey,
    verdict::{Step, Verdict},
};

impl AdminApiValidator {
    pub(super) async fn gateway_steps(&self, gateway: &Gateway) -> Step {
        let class_name = &gateway.spec.gateway_class_name;
        if class_name.is_empty() {
            return Ok(());
        }

        let gateway_class = match self.cache.get_gateway_class(class_name).await {
            Ok(gateway_class) => gateway_class,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(Verdict::failed(REASON_GATEWAY_CLASS_UNRETRIEVABLE, e)),
        };

        if gateway_class.spec.controller_name != self.controller_name {
            debug!("gateway {} belongs to controller {}", ResourceKey::from(gateway), gateway_class.spec.controller_name);
        }
        Ok(())
    }
}
