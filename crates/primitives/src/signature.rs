// Copyright 2024 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt, str::FromStr};

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{consts::CURVE, strip_hex_prefix};

/// Errors of signature parsing and signer recovery.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignatureError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("recovery id must be 0 or 1, got {0}")]
    InvalidRecoveryId(u8),
    #[error("r is zero or not below the group order: {0:#x}")]
    InvalidR(U256),
    #[error("s is zero or above half the group order: {0:#x}")]
    InvalidS(U256),
    #[error("no curve point has x-coordinate r")]
    InvalidPoint,
    #[error("recovered public key is the point at infinity")]
    IdentityPoint,
}

/// A recoverable secp256k1 signature.
///
/// The byte form is `r ‖ s ‖ v`, 65 bytes, where `v` is the parity of the y-coordinate of
/// the nonce point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub r: U256,
    pub s: U256,
    pub v: u8,
}

impl Signature {
    /// Length of the byte form.
    pub const BYTES: usize = 65;

    /// Assembles a signature, moving `s` into the lower half of the group order.
    ///
    /// If `s > n/2` the result carries `n - s` and the flipped recovery id, which
    /// verifies against the same key and digest.
    pub fn from_components(r: U256, s: U256, v: u8) -> Self {
        Self { r, s, v }.normalize_s()
    }

    /// Returns the low-S form of this signature, with `s` first reduced modulo `n`.
    pub fn normalize_s(self) -> Self {
        let s = self.s.reduce_mod(CURVE.order);
        if s > CURVE.half_order {
            Self {
                r: self.r,
                s: CURVE.order - s,
                v: self.v ^ 1,
            }
        } else {
            Self { s, ..self }
        }
    }

    /// Checks the ranges required for recovery: `v ∈ {0, 1}`, `0 < r < n`,
    /// `0 < s <= n/2`.
    pub fn validate(&self) -> Result<(), SignatureError> {
        if self.v > 1 {
            return Err(SignatureError::InvalidRecoveryId(self.v));
        }
        if self.r.is_zero() || self.r >= CURVE.order {
            return Err(SignatureError::InvalidR(self.r));
        }
        if self.s.is_zero() || self.s > CURVE.half_order {
            return Err(SignatureError::InvalidS(self.s));
        }
        Ok(())
    }

    /// Returns the 65-byte `r ‖ s ‖ v` form.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        out[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
        out[64] = self.v;
        out
    }

    /// Parses the 65-byte `r ‖ s ‖ v` form as is, without validation.
    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        Self {
            r: U256::from_be_slice(&bytes[..32]),
            s: U256::from_be_slice(&bytes[32..64]),
            v: bytes[64],
        }
    }

    /// Parses a slice, which must be 65 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        let bytes: &[u8; 65] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidLength(bytes.len()))?;
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(&hex::decode(strip_hex_prefix(s))?)
    }
}
