// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use super::{is_credential_secret, CredentialError, CredentialRecord, CredentialType};
use crate::{
    cluster::ClusterCache,
    common::{ResourceKey, DEFAULT_NAMESPACE_NAME},
    crd::Consumer,
};

/// Secrets left out of an index, usually the ones being validated.
pub type IgnoredSecrets = BTreeSet<ResourceKey>;

/// Unique credential values of every managed consumer, mapped to the secret which holds them.
///
/// The index is rebuilt for every admission request. Two requests racing on the same value can both
/// be admitted since neither sees the other; the later one surfaces as a pre-existing conflict in
/// subsequent builds.
#[derive(Debug, Default)]
pub struct CredentialsIndex {
    entries: HashMap<(CredentialType, &'static str, String), ResourceKey>,
}

impl CredentialsIndex {
    pub async fn build(cache: &dyn ClusterCache, managed_consumers: &[Consumer], ignored: &IgnoredSecrets) -> Self {
        let mut index = Self::default();
        for consumer in managed_consumers {
            let namespace = consumer.metadata.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE_NAME);
            for secret_name in &consumer.spec.credentials {
                let key = ResourceKey::secret(namespace, secret_name);
                if ignored.contains(&key) {
                    continue;
                }

                let secret = match cache.get_secret(namespace, secret_name).await {
                    Ok(secret) => secret,
                    Err(e) => {
                        debug!("skipping credential {key} while indexing {e}");
                        continue;
                    },
                };
                if !is_credential_secret(&secret) {
                    continue;
                }
                match CredentialRecord::try_from(&secret) {
                    Ok(record) => index.insert(&record),
                    Err(e) => debug!("skipping credential {key} while indexing {e}"),
                }
            }
        }
        index
    }

    fn insert(&mut self, record: &CredentialRecord) {
        for (field, value) in record.unique_values() {
            let entry = (record.credential_type, field, value.to_owned());
            match self.entries.get(&entry) {
                Some(owner) if *owner != record.secret => {
                    warn!(
                        "{} credentials {} and {owner} already share a value for field {field}",
                        record.credential_type, record.secret
                    );
                },
                Some(_) => (),
                None => {
                    self.entries.insert(entry, record.secret.clone());
                },
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fails with the first unique field of `record` whose value is already claimed by another secret.
    pub fn check(&self, record: &CredentialRecord) -> Result<(), CredentialError> {
        for (field, value) in record.unique_values() {
            if let Some(owner) = self.entries.get(&(record.credential_type, field, value.to_owned())) {
                if *owner != record.secret {
                    return Err(CredentialError::Conflict { credential_type: record.credential_type, field, owner: owner.clone() });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::test::{credential_secret, managed_consumer},
        credentials::validate_credentials,
        state::ClusterState,
    };

    fn state_with(secrets: &[(&str, &str, &str)]) -> ClusterState {
        let state = ClusterState::new();
        for (name, cred_type, key) in secrets {
            state.save_secret(credential_secret("team-a", name, &[("credType", cred_type), ("key", key)])).unwrap();
        }
        state
    }

    #[tokio::test]
    async fn distinct_values_do_not_conflict() {
        let state = state_with(&[("s1", "key-auth", "k1"), ("s2", "key-auth", "k2"), ("s3", "key-auth", "k3")]);
        let consumers = vec![managed_consumer("team-a", "alice", &["s1", "s2"]), managed_consumer("team-a", "bob", &["s3"])];

        let index = CredentialsIndex::build(&state, &consumers, &IgnoredSecrets::new()).await;
        assert_eq!(index.len(), 3);

        let candidate = validate_credentials(&credential_secret("team-a", "s4", &[("credType", "key-auth"), ("key", "k4")])).unwrap();
        assert_eq!(index.check(&candidate), Ok(()));
    }

    #[tokio::test]
    async fn duplicate_value_names_field_and_owner() {
        let state = state_with(&[("s2", "key-auth", "abc")]);
        let consumers = vec![managed_consumer("team-a", "bob", &["s2"])];

        let index = CredentialsIndex::build(&state, &consumers, &IgnoredSecrets::new()).await;
        let candidate = validate_credentials(&credential_secret("team-a", "s1", &[("credType", "key-auth"), ("key", "abc")])).unwrap();
        let error = index.check(&candidate).unwrap_err();
        assert_eq!(
            error,
            CredentialError::Conflict { credential_type: CredentialType::KeyAuth, field: "key", owner: ResourceKey::secret("team-a", "s2") }
        );
        assert!(error.to_string().contains("key"));
        assert!(error.to_string().contains("team-a/s2"));
    }

    #[tokio::test]
    async fn same_value_under_another_type_is_allowed() {
        let state = state_with(&[("s2", "jwt", "abc")]);
        let consumers = vec![managed_consumer("team-a", "bob", &["s2"])];

        let index = CredentialsIndex::build(&state, &consumers, &IgnoredSecrets::new()).await;
        let candidate = validate_credentials(&credential_secret("team-a", "s1", &[("credType", "key-auth"), ("key", "abc")])).unwrap();
        assert_eq!(index.check(&candidate), Ok(()));
    }

    #[tokio::test]
    async fn ignored_secrets_are_never_owners() {
        let state = state_with(&[("s1", "key-auth", "abc")]);
        let consumers = vec![managed_consumer("team-a", "alice", &["s1"])];
        let ignored = IgnoredSecrets::from([ResourceKey::secret("team-a", "s1")]);

        let index = CredentialsIndex::build(&state, &consumers, &ignored).await;
        assert!(index.is_empty());

        let updated = validate_credentials(&credential_secret("team-a", "s1", &[("credType", "key-auth"), ("key", "abc")])).unwrap();
        assert_eq!(index.check(&updated), Ok(()));
    }

    #[tokio::test]
    async fn missing_and_untyped_secrets_are_skipped() {
        let state = state_with(&[("s1", "key-auth", "abc")]);
        state.save_secret(credential_secret("team-a", "plain", &[("key", "abc")])).unwrap();
        let consumers = vec![managed_consumer("team-a", "alice", &["s1", "plain", "gone"])];

        let index = CredentialsIndex::build(&state, &consumers, &IgnoredSecrets::new()).await;
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn first_claimant_wins() {
        let state = state_with(&[("s1", "key-auth", "abc"), ("s2", "key-auth", "abc")]);
        let consumers = vec![managed_consumer("team-a", "alice", &["s1"]), managed_consumer("team-a", "bob", &["s2"])];

        let index = CredentialsIndex::build(&state, &consumers, &IgnoredSecrets::new()).await;
        assert_eq!(index.len(), 1);

        let candidate = validate_credentials(&credential_secret("team-a", "s2", &[("credType", "key-auth"), ("key", "abc")])).unwrap();
        assert!(matches!(index.check(&candidate), Err(CredentialError::Conflict { owner, .. }) if owner == ResourceKey::secret("team-a", "s1")));
    }
}
