// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::membership::{ClassMatching, IngressClassMatcher};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("unable to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Settings shared by every validator of one controller instance.
#[derive(Clone, Debug, Deserialize, TypedBuilder, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Gateway classes naming this controller are the ones whose gateways and routes get validated.
    #[builder(setter(into))]
    pub controller_name: String,
    /// Value of the ingress class annotation marking consumers, consumer groups and credentials as managed.
    #[builder(setter(into))]
    pub ingress_class: String,
    #[serde(default)]
    #[builder(default)]
    pub class_matching: ClassMatching,
}

impl Configuration {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        let configuration: Configuration = serde_yaml::from_str(yaml)?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.controller_name.trim().is_empty() {
            return Err(ConfigurationError::Invalid("controller name cannot be empty"));
        }
        if self.ingress_class.trim().is_empty() {
            return Err(ConfigurationError::Invalid("ingress class cannot be empty"));
        }
        Ok(())
    }

    pub fn ingress_class_matcher(&self) -> IngressClassMatcher {
        IngressClassMatcher::new(&self.ingress_class, self.class_matching)
    }
}
