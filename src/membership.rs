// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//
use kube::api::ObjectMeta;
use serde::Deserialize;

use crate::common::INGRESS_CLASS_ANNOTATION;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClassMatching {
    /// Every object is considered managed.
    Ignore,
    /// The class annotation must be present and equal to the configured class.
    #[default]
    Exact,
    /// Objects without a class annotation are claimed as well.
    ExactOrEmpty,
}

/// Decides whether an object belongs to this controller instance based on its ingress class annotation.
#[derive(Clone, Debug)]
pub struct IngressClassMatcher {
    ingress_class: String,
    class_matching: ClassMatching,
}

impl IngressClassMatcher {
    pub fn new(ingress_class: &str, class_matching: ClassMatching) -> Self {
        Self { ingress_class: ingress_class.to_owned(), class_matching }
    }

    pub fn ingress_class(&self) -> &str {
        &self.ingress_class
    }

    pub fn is_managed(&self, meta: &ObjectMeta) -> bool {
        self.is_managed_with(meta, INGRESS_CLASS_ANNOTATION, self.class_matching)
    }

    pub fn is_managed_with(&self, meta: &ObjectMeta, class_key: &str, class_matching: ClassMatching) -> bool {
        let class = meta.annotations.as_ref().and_then(|annotations| annotations.get(class_key)).map_or("", String::as_str);
        match class_matching {
            ClassMatching::Ignore => true,
            ClassMatching::Exact => class == self.ingress_class,
            ClassMatching::ExactOrEmpty => class.is_empty() || class == self.ingress_class,
        }
    }
}
