// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Traceability token — a short SHA-256 label tying a copy to its recipient,
// purpose, holder, and date. It is a provenance hint, not a signature.

use std::fmt;

use stampwerk_core::StampIdentity;

use crate::integrity::hash_bytes;

/// Number of hex characters kept from the digest.
pub const TOKEN_LEN: usize = 16;

/// A 16-character lowercase hex label derived from a [`StampIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceToken(String);

impl TraceToken {
    /// Derive the token from `who|purpose|name|date` (UTF-8).
    pub fn derive(identity: &StampIdentity) -> Self {
        let mut digest = hash_bytes(identity.token_source().as_bytes());
        digest.truncate(TOKEN_LEN);
        Self(digest)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
