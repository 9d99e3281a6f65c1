// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use std::fmt::Display;

use thiserror::Error;

use crate::{admin_api::AdminApiError, cluster::LookupError};

/// Cause of a validation that could not reach a decision.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("cluster lookup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("admin api call failed: {0}")]
    AdminApi(#[from] AdminApiError),
}

/// Outcome of validating a single object.
///
/// `Failed` is indeterminate: the object must not be admitted, but it was not found invalid either.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted,
    Rejected(String),
    Failed { reason: String, error: ValidationError },
}

impl Verdict {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Verdict::Rejected(reason.into())
    }

    pub fn failed(reason: impl Into<String>, error: impl Into<ValidationError>) -> Self {
        Verdict::Failed { reason: reason.into(), error: error.into() }
    }

    pub fn accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    pub fn reason(&self) -> &str {
        match self {
            Verdict::Accepted => "",
            Verdict::Rejected(reason) | Verdict::Failed { reason, .. } => reason,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Verdict::Failed { error, .. } => Some(error),
            Verdict::Accepted | Verdict::Rejected(_) => None,
        }
    }

    /// The `(accepted, reason, error)` triple handed to the admission server.
    pub fn into_parts(self) -> (bool, String, Option<ValidationError>) {
        match self {
            Verdict::Accepted => (true, String::new(), None),
            Verdict::Rejected(reason) => (false, reason, None),
            Verdict::Failed { reason, error } => (false, reason, Some(error)),
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::Rejected(reason) => write!(f, "rejected: {reason}"),
            Verdict::Failed { reason, error } => write!(f, "failed: {reason}: {error}"),
        }
    }
}

/// One guard of a validator. `Err` stops the validation with the carried verdict, which may be `Accepted`.
pub(crate) type Step<T = ()> = std::result::Result<T, Verdict>;

pub(crate) fn conclude(step: Step) -> Verdict {
    match step {
        Ok(()) => Verdict::Accepted,
        Err(verdict) => verdict,
    }
}
