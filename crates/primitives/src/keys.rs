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

use alloy_primitives::Address;
use k256::{
    elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint},
    AffinePoint, EncodedPoint, FieldBytes, NonZeroScalar, ProjectivePoint,
};
use thiserror::Error;

use crate::{keccak::keccak, strip_hex_prefix};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KeyError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
    #[error("private key is zero or not below the group order")]
    InvalidScalar,
    #[error("public key is not a point on the curve")]
    NotOnCurve,
}

/// A secp256k1 private key: a non-zero scalar below the group order.
#[derive(Clone)]
pub struct PrivateKey(NonZeroScalar);

impl PrivateKey {
    /// Parses a private key from its 32-byte big-endian form.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        Option::<NonZeroScalar>::from(NonZeroScalar::from_repr(*FieldBytes::from_slice(bytes)))
            .map(PrivateKey)
            .ok_or(KeyError::InvalidScalar)
    }

    /// Parses a private key from a slice, which must be 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| KeyError::InvalidLength {
            expected: 32,
            got: bytes.len(),
        })?;
        Self::from_bytes(bytes)
    }

    /// Returns the 32-byte big-endian form of the key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes().into()
    }

    /// Returns the scalar of the key.
    pub(crate) fn scalar(&self) -> &NonZeroScalar {
        &self.0
    }

    /// Derives the public key `d·G`.
    pub fn public_key(&self) -> PublicKey {
        let point = (ProjectivePoint::GENERATOR * *self.0).to_affine();
        PublicKey::from_affine(&point)
    }

    /// Derives the address of the key.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }
}

// never print key material
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&"..").finish()
    }
}

impl FromStr for PrivateKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(&hex::decode(strip_hex_prefix(s))?)
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

/// An uncompressed secp256k1 public key without the SEC1 tag: `x ‖ y`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 64]);

impl PublicKey {
    /// Parses a 64-byte `x ‖ y` public key, checking that it lies on the curve.
    pub fn from_bytes(bytes: &[u8; 64]) -> Result<Self, KeyError> {
        let mut tagged = [0u8; 65];
        tagged[0] = 0x04;
        tagged[1..].copy_from_slice(bytes);
        let encoded = EncodedPoint::from_bytes(tagged).map_err(|_| KeyError::NotOnCurve)?;
        Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .map(|point| Self::from_affine(&point))
            .ok_or(KeyError::NotOnCurve)
    }

    /// Parses a public key from a slice, which must be 64 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: &[u8; 64] = bytes.try_into().map_err(|_| KeyError::InvalidLength {
            expected: 64,
            got: bytes.len(),
        })?;
        Self::from_bytes(bytes)
    }

    pub(crate) fn from_affine(point: &AffinePoint) -> Self {
        let encoded = point.to_encoded_point(false);
        let encoded = encoded.as_bytes();
        debug_assert_eq!(encoded[0], 0x04);
        let mut out = [0u8; 64];
        out.copy_from_slice(&encoded[1..]);
        Self(out)
    }

    /// Returns the raw `x ‖ y` bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Derives the address: the low 20 bytes of `keccak(x ‖ y)`.
    pub fn address(&self) -> Address {
        let hash = keccak(self.0);
        Address::from_slice(&hash[12..])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(&hex::decode(strip_hex_prefix(s))?)
    }
}
