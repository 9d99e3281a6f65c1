// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use std::fmt::Display;

use semver::Version;
use thiserror::Error;

/// Consumer groups need an enterprise gateway of at least this version.
pub const CONSUMER_GROUPS_VERSION_CUTOFF: Version = Version::new(3, 4, 0);

const ENTERPRISE_MARKER: &str = "enterprise";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("empty version string")]
    Empty,
    #[error("version {0} has fewer than three components")]
    TooShort(String),
    #[error("version {version} has a non numeric component {component}")]
    NotNumeric { version: String, component: String },
}

/// Version reported by the gateway Admin API, e.g. `3.4.1`, `3.4.1.0` or `2.8.4.1-enterprise-edition`.
///
/// Enterprise builds carry a fourth numeric component or an `enterprise` suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub enterprise: bool,
}

impl GatewayVersion {
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let trimmed = version.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let (numbers, suffix) = trimmed.split_once('-').unwrap_or((trimmed, ""));
        let components = numbers
            .split('.')
            .map(|component| {
                component.parse::<u64>().map_err(|_| VersionError::NotNumeric { version: version.to_owned(), component: component.to_owned() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let [major, minor, patch, rest @ ..] = components.as_slice() else {
            return Err(VersionError::TooShort(version.to_owned()));
        };

        Ok(Self { major: *major, minor: *minor, patch: *patch, enterprise: !rest.is_empty() || suffix.contains(ENTERPRISE_MARKER) })
    }

    /// Only major and minor take part in feature gating.
    pub fn major_minor(&self) -> Version {
        Version::new(self.major, self.minor, 0)
    }

    pub fn supports_consumer_groups(&self) -> bool {
        self.enterprise && self.major_minor() >= CONSUMER_GROUPS_VERSION_CUTOFF
    }
}

impl Display for GatewayVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.enterprise {
            write!(f, " (enterprise)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_open_source_and_enterprise_versions() {
        let oss = GatewayVersion::parse("3.4.1").unwrap();
        assert_eq!((oss.major, oss.minor, oss.patch, oss.enterprise), (3, 4, 1, false));

        let enterprise = GatewayVersion::parse("3.4.1.0").unwrap();
        assert!(enterprise.enterprise);

        let suffixed = GatewayVersion::parse("2.8.4-enterprise-edition").unwrap();
        assert!(suffixed.enterprise);
        assert_eq!(suffixed.major_minor(), Version::new(2, 8, 0));

        assert!(!GatewayVersion::parse("v3.5.0-rc1").unwrap().enterprise);
    }

    #[test]
    fn consumer_groups_gate() {
        assert!(GatewayVersion::parse("3.4.0.0").unwrap().supports_consumer_groups());
        assert!(GatewayVersion::parse("3.10.0.1").unwrap().supports_consumer_groups());
        assert!(!GatewayVersion::parse("3.3.9.9").unwrap().supports_consumer_groups());
        assert!(!GatewayVersion::parse("3.6.0").unwrap().supports_consumer_groups());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(GatewayVersion::parse("  "), Err(VersionError::Empty));
        assert_eq!(GatewayVersion::parse("3.4"), Err(VersionError::TooShort("3.4".to_owned())));
        assert!(matches!(GatewayVersion::parse("3.x.1"), Err(VersionError::NotNumeric { .. })));
    }
}
