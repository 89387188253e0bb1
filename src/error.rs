// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Domain errors raised before any write happens. Everything else
/// (I/O, SQL) travels as `anyhow::Error` at the command layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input caught by validation: out-of-range numbers, date
    /// ordering, missing required fields.
    #[error("{0}")]
    Validation(String),

    /// The entity does not exist under the active profile. Lookups are
    /// profile-scoped, so another profile's entity reports the same way.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
}

impl Error {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }
}
