// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Error types shared across the crate

use thiserror::Error;

/// Errors surfaced by shape evaluation.
///
/// `Argument` covers malformed input to a core operation; `Kernel` covers
/// failures reported by the geometry kernel or the hull facet enumerator.
/// Neither kind is retried or downgraded anywhere in the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Argument(String),

    #[error("{0}")]
    Kernel(String),
}

impl Error {
    pub fn argument(msg: impl Into<String>) -> Self {
        Error::Argument(msg.into())
    }

    pub fn kernel(msg: impl Into<String>) -> Self {
        Error::Kernel(msg.into())
    }

    /// True for the argument-error kind.
    pub fn is_argument(&self) -> bool {
        matches!(self, Error::Argument(_))
    }

    /// True for the kernel-error kind.
    pub fn is_kernel(&self) -> bool {
        matches!(self, Error::Kernel(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
