// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use tracing::debug;

use super::{consumer::credential_rejection, AdminApiValidator};
use crate::{
    common::{ResourceKey, DEFAULT_NAMESPACE_NAME},
    credentials::{is_credential_secret, validate_credentials, CredentialsIndex, IgnoredSecrets},
    verdict::{Step, Verdict},
};

impl AdminApiValidator {
    /// Credential secrets are only checked once a managed consumer references them.
    pub(super) async fn credential_steps(&self, secret: &Secret) -> Step {
        if !is_credential_secret(secret) {
            return Ok(());
        }

        let managed_consumers = self.list_managed_consumers().await?;

        let namespace = secret.metadata.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE_NAME);
        let name = secret.name_any();
        if !managed_consumers.iter().any(|consumer| consumer.references_secret(namespace, &name)) {
            debug!("credential {namespace}/{name} is not referenced by any managed consumer");
            return Err(Verdict::Accepted);
        }

        let record = validate_credentials(secret).map_err(credential_rejection)?;
        let ignored = IgnoredSecrets::from([ResourceKey::secret(namespace, &name)]);
        let index = CredentialsIndex::build(self.cache.as_ref(), &managed_consumers, &ignored).await;
        index.check(&record).map_err(credential_rejection)
    }
}
