// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
//! Consumer credentials stored in secrets.
//!
//! A secret is a credential when it carries the [`CREDENTIAL_TYPE_KEY`] entry. The remaining entries are
//! the credential fields, some of which are required and some of which must be unique across every
//! credential of the same type.

mod index;

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

pub use index::{CredentialsIndex, IgnoredSecrets};
use k8s_openapi::api::core::v1::Secret;
use thiserror::Error;

use crate::common::ResourceKey;

pub const CREDENTIAL_TYPE_KEY: &str = "credType";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialType {
    KeyAuth,
    BasicAuth,
    HmacAuth,
    Jwt,
    OAuth2,
    Acl,
    MtlsAuth,
}

impl CredentialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialType::KeyAuth => "key-auth",
            CredentialType::BasicAuth => "basic-auth",
            CredentialType::HmacAuth => "hmac-auth",
            CredentialType::Jwt => "jwt",
            CredentialType::OAuth2 => "oauth2",
            CredentialType::Acl => "acl",
            CredentialType::MtlsAuth => "mtls-auth",
        }
    }

    /// Fields which must hold a value unique among all credentials of this type.
    pub fn unique_fields(&self) -> &'static [&'static str] {
        match self {
            CredentialType::KeyAuth | CredentialType::Jwt => &["key"],
            CredentialType::BasicAuth | CredentialType::HmacAuth => &["username"],
            CredentialType::OAuth2 => &["client_id"],
            CredentialType::Acl | CredentialType::MtlsAuth => &[],
        }
    }

    fn required_fields(&self, fields: &BTreeMap<String, String>) -> Vec<&'static str> {
        match self {
            CredentialType::KeyAuth => vec!["key"],
            CredentialType::BasicAuth => vec!["username", "password"],
            CredentialType::HmacAuth => vec!["username", "secret"],
            CredentialType::Jwt => {
                let asymmetric = fields.get("algorithm").is_some_and(|algorithm| ["RS", "ES", "PS"].iter().any(|prefix| algorithm.starts_with(prefix)));
                if asymmetric {
                    vec!["key", "rsa_public_key"]
                } else {
                    vec!["key", "secret"]
                }
            },
            CredentialType::OAuth2 => vec!["name", "client_id"],
            CredentialType::Acl => vec!["group"],
            CredentialType::MtlsAuth => vec!["subject_name"],
        }
    }
}

impl FromStr for CredentialType {
    type Err = CredentialError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "key-auth" | "keyauth_credential" => Ok(CredentialType::KeyAuth),
            "basic-auth" | "basicauth_credential" => Ok(CredentialType::BasicAuth),
            "hmac-auth" | "hmacauth_credential" => Ok(CredentialType::HmacAuth),
            "jwt" | "jwt_secret" => Ok(CredentialType::Jwt),
            "oauth2" => Ok(CredentialType::OAuth2),
            "acl" => Ok(CredentialType::Acl),
            "mtls-auth" => Ok(CredentialType::MtlsAuth),
            other => Err(CredentialError::UnsupportedType(other.to_owned())),
        }
    }
}

impl Display for CredentialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("secret {0} has no credType entry")]
    MissingType(ResourceKey),
    #[error("unsupported credential type {0}")]
    UnsupportedType(String),
    #[error("field {field} of secret {secret} is not valid utf-8")]
    InvalidEncoding { secret: ResourceKey, field: String },
    #[error("{credential_type} credential {secret} is missing required field {field}")]
    MissingField { secret: ResourceKey, credential_type: CredentialType, field: &'static str },
    #[error("unique key constraint violated for {credential_type}: field {field} is already in use by secret {owner}")]
    Conflict { credential_type: CredentialType, field: &'static str, owner: ResourceKey },
}

/// The typed view of a credential secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialRecord {
    pub secret: ResourceKey,
    pub credential_type: CredentialType,
    pub fields: BTreeMap<String, String>,
}

impl CredentialRecord {
    /// Values of the fields which take part in uniqueness constraints, in declaration order.
    pub fn unique_values(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.credential_type.unique_fields().iter().filter_map(|field| self.fields.get(*field).map(|value| (*field, value.as_str())))
    }
}

pub fn is_credential_secret(secret: &Secret) -> bool {
    secret.data.as_ref().is_some_and(|data| data.contains_key(CREDENTIAL_TYPE_KEY))
        || secret.string_data.as_ref().is_some_and(|data| data.contains_key(CREDENTIAL_TYPE_KEY))
}

impl TryFrom<&Secret> for CredentialRecord {
    type Error = CredentialError;

    fn try_from(secret: &Secret) -> Result<Self, Self::Error> {
        let key = ResourceKey::from(secret);
        let mut fields = BTreeMap::new();
        for (field, value) in secret.data.iter().flatten() {
            let value = String::from_utf8(value.0.clone()).map_err(|_| CredentialError::InvalidEncoding { secret: key.clone(), field: field.clone() })?;
            fields.insert(field.clone(), value);
        }
        for (field, value) in secret.string_data.iter().flatten() {
            fields.insert(field.clone(), value.clone());
        }

        let credential_type = fields.remove(CREDENTIAL_TYPE_KEY).ok_or_else(|| CredentialError::MissingType(key.clone()))?;
        let credential_type = CredentialType::from_str(credential_type.trim())?;
        Ok(Self { secret: key, credential_type, fields })
    }
}

/// Checks a single credential secret for a known type and the fields that type requires.
pub fn validate_credentials(secret: &Secret) -> Result<CredentialRecord, CredentialError> {
    let record = CredentialRecord::try_from(secret)?;
    for field in record.credential_type.required_fields(&record.fields) {
        if record.fields.get(field).map_or(true, |value| value.trim().is_empty()) {
            return Err(CredentialError::MissingField { secret: record.secret.clone(), credential_type: record.credential_type, field });
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test::credential_secret;

    #[test]
    fn data_and_string_data_are_merged() {
        let secret: Secret = serde_yaml::from_str(
            r"
apiVersion: v1
kind: Secret
metadata:
  name: alice-basic
  namespace: team-a
data:
  credType: YmFzaWMtYXV0aA==
  username: YWxpY2U=
stringData:
  password: s3cr3t
",
        )
        .unwrap();

        let record = validate_credentials(&secret).unwrap();
        assert_eq!(record.credential_type, CredentialType::BasicAuth);
        assert_eq!(record.fields.get("username").map(String::as_str), Some("alice"));
        assert_eq!(record.unique_values().collect::<Vec<_>>(), vec![("username", "alice")]);
    }

    #[test]
    fn missing_required_field() {
        let secret = credential_secret("team-a", "alice-key", &[("credType", "key-auth"), ("key", " ")]);
        assert_eq!(
            validate_credentials(&secret),
            Err(CredentialError::MissingField { secret: ResourceKey::secret("team-a", "alice-key"), credential_type: CredentialType::KeyAuth, field: "key" })
        );
    }

    #[test]
    fn jwt_requirements_follow_algorithm() {
        let symmetric = credential_secret("team-a", "jwt", &[("credType", "jwt"), ("key", "issuer"), ("secret", "s")]);
        assert!(validate_credentials(&symmetric).is_ok());

        let asymmetric = credential_secret("team-a", "jwt", &[("credType", "jwt"), ("key", "issuer"), ("algorithm", "RS256"), ("secret", "s")]);
        assert!(matches!(validate_credentials(&asymmetric), Err(CredentialError::MissingField { field: "rsa_public_key", .. })));
    }

    #[test]
    fn unknown_or_missing_type() {
        let unknown = credential_secret("team-a", "x", &[("credType", "ldap-auth")]);
        assert_eq!(validate_credentials(&unknown), Err(CredentialError::UnsupportedType("ldap-auth".to_owned())));

        let untyped = credential_secret("team-a", "x", &[("key", "abc")]);
        assert!(!is_credential_secret(&untyped));
        assert_eq!(validate_credentials(&untyped), Err(CredentialError::MissingType(ResourceKey::secret("team-a", "x"))));
    }

    #[test]
    fn acl_has_no_unique_fields() {
        let secret = credential_secret("team-a", "acl", &[("credType", "acl"), ("group", "admins")]);
        let record = validate_credentials(&secret).unwrap();
        assert_eq!(record.unique_values().count(), 0);
    }
}
