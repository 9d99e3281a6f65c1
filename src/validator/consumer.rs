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
    AdminApiValidator, REASON_CONSUMER_CREDENTIAL_SECRET_NOT_FOUND, REASON_CONSUMER_CREDENTIAL_VALIDATION_FAILED, REASON_CONSUMER_EXISTS,
    REASON_CONSUMER_UNRETRIEVABLE, REASON_CONSUMER_USERNAME_EMPTY, REASON_FAILED_TO_RETRIEVE_SECRET,
};
use crate::{
    common::{ResourceKey, DEFAULT_NAMESPACE_NAME},
    credentials::{validate_credentials, CredentialError, CredentialsIndex, IgnoredSecrets},
    crd::Consumer,
    verdict::{Step, Verdict},
};

pub(super) fn credential_rejection(error: CredentialError) -> Verdict {
    Verdict::rejected(format!("{REASON_CONSUMER_CREDENTIAL_VALIDATION_FAILED}: {error}"))
}

impl AdminApiValidator {
    pub(super) async fn consumer_steps(&self, consumer: &Consumer) -> Step {
        self.ensure_managed(&consumer.metadata)?;

        if consumer.spec.username.is_empty() {
            return Err(Verdict::rejected(REASON_CONSUMER_USERNAME_EMPTY));
        }

        self.ensure_consumer_not_in_gateway(&consumer.spec.username).await?;

        if consumer.spec.credentials.is_empty() {
            return Ok(());
        }

        let managed_consumers = self.list_managed_consumers().await?;

        let namespace = consumer.metadata.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE_NAME);
        let mut records = Vec::with_capacity(consumer.spec.credentials.len());
        let mut ignored = IgnoredSecrets::new();
        for secret_name in &consumer.spec.credentials {
            let key = ResourceKey::secret(namespace, secret_name);
            let secret = self.cache.get_secret(namespace, secret_name).await.map_err(|e| {
                if e.is_not_found() {
                    Verdict::rejected(format!("{REASON_CONSUMER_CREDENTIAL_SECRET_NOT_FOUND} {key}"))
                } else {
                    Verdict::failed(REASON_FAILED_TO_RETRIEVE_SECRET, e)
                }
            })?;
            records.push(validate_credentials(&secret).map_err(credential_rejection)?);
            ignored.insert(key);
        }

        // Secrets of this consumer are left out so that they are not checked against themselves.
        let index = CredentialsIndex::build(self.cache.as_ref(), &managed_consumers, &ignored).await;
        for record in &records {
            index.check(record).map_err(credential_rejection)?;
        }
        Ok(())
    }

    async fn ensure_consumer_not_in_gateway(&self, username: &str) -> Step {
        let Some(consumers) = self.services.consumers_service() else {
            return Ok(());
        };

        match consumers.get(username).await {
            Ok(_) => Err(Verdict::rejected(REASON_CONSUMER_EXISTS)),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => {
                warn!("failed to fetch consumer {username} from the admin API {e}");
                Err(Verdict::failed(REASON_CONSUMER_UNRETRIEVABLE, e))
            },
        }
        .inspect_err(|verdict| debug!("consumer {username} {verdict}"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        admin_api::{AdminApiError, StaticServicesProvider},
        cluster::LookupError,
        common::test::{consumer, credential_secret, managed_consumer, TEST_INGRESS_CLASS},
        state::ClusterState,
        validator::{
            test::{validator, validator_with_cache, MockConsumers, UnavailableCache, UnlistableCache},
            AdmissionValidator,
        },
        ValidationError,
    };

    fn key_auth(state: &ClusterState, name: &str, key: &str) {
        state.save_secret(credential_secret("team-a", name, &[("credType", "key-auth"), ("key", key)])).unwrap();
    }

    #[tokio::test]
    async fn unmanaged_consumer_is_accepted_without_checks() {
        let consumers = MockConsumers::existing("alice");
        let validator = validator(&ClusterState::new(), StaticServicesProvider::builder().consumers(Arc::<MockConsumers>::clone(&consumers)).build());

        let foreign = consumer("team-a", "alice", Some("other"), "", &["missing"]);
        assert_eq!(validator.validate_consumer(&foreign).await, Verdict::Accepted);
        let unannotated = consumer("team-a", "alice", None, "", &[]);
        assert_eq!(validator.validate_consumer(&unannotated).await, Verdict::Accepted);
        assert_eq!(consumers.calls(), 0);
    }

    #[tokio::test]
    async fn empty_username_is_rejected_before_remote_calls() {
        let consumers = MockConsumers::existing("alice");
        let with_service = validator(&ClusterState::new(), StaticServicesProvider::builder().consumers(Arc::<MockConsumers>::clone(&consumers)).build());
        let without_services = validator(&ClusterState::new(), StaticServicesProvider::unavailable());

        let nameless = consumer("team-a", "alice", Some(TEST_INGRESS_CLASS), "", &[]);
        assert_eq!(with_service.validate_consumer(&nameless).await, Verdict::rejected(REASON_CONSUMER_USERNAME_EMPTY));
        assert_eq!(without_services.validate_consumer(&nameless).await, Verdict::rejected(REASON_CONSUMER_USERNAME_EMPTY));
        assert_eq!(consumers.calls(), 0);
    }

    #[tokio::test]
    async fn consumer_known_to_the_gateway() {
        let state = ClusterState::new();
        let alice = managed_consumer("team-a", "alice", &[]);

        let consumers = MockConsumers::existing("alice");
        let validator_with_existing = validator(&state, StaticServicesProvider::builder().consumers(Arc::<MockConsumers>::clone(&consumers)).build());
        assert_eq!(validator_with_existing.validate_consumer(&alice).await, Verdict::rejected(REASON_CONSUMER_EXISTS));
        assert_eq!(consumers.calls(), 1);

        let validator_with_missing = validator(&state, StaticServicesProvider::builder().consumers(MockConsumers::missing()).build());
        assert_eq!(validator_with_missing.validate_consumer(&alice).await, Verdict::Accepted);

        let broken = MockConsumers::responding(Err(AdminApiError::from_status(500, "boom")));
        let validator_with_broken = validator(&state, StaticServicesProvider::builder().consumers(broken).build());
        let verdict = validator_with_broken.validate_consumer(&alice).await;
        assert_eq!(verdict.reason(), REASON_CONSUMER_UNRETRIEVABLE);
        assert!(matches!(verdict.error(), Some(ValidationError::AdminApi(AdminApiError::Unexpected { status: Some(500), .. }))));
    }

    #[tokio::test]
    async fn credentials_must_exist_and_be_valid() {
        let state = ClusterState::new();
        state.save_secret(credential_secret("team-a", "broken", &[("credType", "basic-auth"), ("username", "alice")])).unwrap();
        let validator = validator(&state, StaticServicesProvider::unavailable());

        let verdict = validator.validate_consumer(&managed_consumer("team-a", "alice", &["missing"])).await;
        assert_eq!(verdict, Verdict::rejected(format!("{REASON_CONSUMER_CREDENTIAL_SECRET_NOT_FOUND} team-a/missing")));
        assert!(verdict.error().is_none());

        let verdict = validator.validate_consumer(&managed_consumer("team-a", "alice", &["broken"])).await;
        assert!(verdict.reason().starts_with(REASON_CONSUMER_CREDENTIAL_VALIDATION_FAILED));
        assert!(verdict.reason().contains("password"));
    }

    #[tokio::test]
    async fn duplicate_key_is_rejected_with_owner() {
        let state = ClusterState::new();
        key_auth(&state, "s1", "abc");
        key_auth(&state, "s2", "abc");
        state.save_consumer(managed_consumer("team-a", "bob", &["s2"])).unwrap();
        let validator = validator(&state, StaticServicesProvider::unavailable());

        let alice = managed_consumer("team-a", "alice", &["s1"]);
        state.save_consumer(alice.clone()).unwrap();
        let verdict = validator.validate_consumer(&alice).await;
        assert!(!verdict.accepted());
        assert!(verdict.error().is_none());
        assert!(verdict.reason().contains("field key"));
        assert!(verdict.reason().contains("team-a/s2"));
    }

    #[tokio::test]
    async fn revalidating_an_admitted_consumer_is_idempotent() {
        let state = ClusterState::new();
        key_auth(&state, "s1", "abc");
        key_auth(&state, "s2", "def");
        let alice = managed_consumer("team-a", "alice", &["s1"]);
        state.save_consumer(alice.clone()).unwrap();
        state.save_consumer(managed_consumer("team-a", "bob", &["s2"])).unwrap();
        let validator = validator(&state, StaticServicesProvider::unavailable());

        assert_eq!(validator.validate_consumer(&alice).await, Verdict::Accepted);
        assert_eq!(validator.validate_consumer(&alice).await, Verdict::Accepted);
    }

    #[tokio::test]
    async fn credentials_of_unmanaged_consumers_do_not_conflict() {
        let state = ClusterState::new();
        key_auth(&state, "s1", "abc");
        key_auth(&state, "s2", "abc");
        state.save_consumer(consumer("team-a", "bob", Some("other"), "bob", &["s2"])).unwrap();
        let validator = validator(&state, StaticServicesProvider::unavailable());

        assert_eq!(validator.validate_consumer(&managed_consumer("team-a", "alice", &["s1"])).await, Verdict::Accepted);
    }

    #[tokio::test]
    async fn failing_cache_is_not_a_rejection() {
        let validator = validator_with_cache(Arc::new(UnavailableCache), StaticServicesProvider::unavailable());

        let verdict = validator.validate_consumer(&managed_consumer("team-a", "alice", &["s1"])).await;
        assert_eq!(verdict, Verdict::failed(REASON_FAILED_TO_RETRIEVE_SECRET, LookupError::Unavailable("timeout".to_owned())));
    }

    #[tokio::test]
    async fn failing_consumer_listing_is_not_a_rejection() {
        let validator = validator_with_cache(Arc::new(UnlistableCache), StaticServicesProvider::unavailable());

        let verdict = validator.validate_consumer(&managed_consumer("team-a", "alice", &["s1"])).await;
        assert_eq!(verdict, Verdict::failed(REASON_CONSUMER_UNRETRIEVABLE, LookupError::Unavailable("timeout".to_owned())));
        assert!(verdict.error().is_some());

        let without_credentials = managed_consumer("team-a", "alice", &[]);
        assert_eq!(validator.validate_consumer(&without_credentials).await, Verdict::Accepted);
    }
}
