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

use alloy_primitives::{Address, B256, U256};
use k256::{
    elliptic_curve::{ops::Reduce, point::AffineCoordinates},
    FieldBytes, NonZeroScalar, ProjectivePoint, Scalar,
};
use log::{debug, trace};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use sha2::{Digest, Sha512};

use crate::{consts::CURVE, keys::PrivateKey, signature::Signature};

/// Something that can produce recoverable signatures over 32-byte digests.
///
/// [PrivateKey] signs locally. Integrations that keep the key elsewhere, such as a
/// hardware module, implement this trait around their own signing call.
pub trait HashSigner {
    /// Address the produced signatures should recover to.
    fn address(&self) -> Address;

    /// Signs a 32-byte digest.
    fn sign_hash(&self, hash: &B256) -> anyhow::Result<Signature>;
}

impl HashSigner for PrivateKey {
    fn address(&self) -> Address {
        PrivateKey::address(self)
    }

    fn sign_hash(&self, hash: &B256) -> anyhow::Result<Signature> {
        Ok(sign_hash(self, hash))
    }
}

/// Signs `hash` with `key`.
///
/// The nonce `k` is drawn from a ChaCha20 keystream keyed by
/// `SHA-512(key ‖ salt ‖ hash)`, so the same key and digest always produce the same
/// signature. Candidates are consumed 32 bytes at a time until one yields valid `r`
/// and `s`. The result is in low-S form.
pub fn sign_hash(key: &PrivateKey, hash: &B256) -> Signature {
    let d: Scalar = *key.scalar().as_ref();
    let e = <Scalar as Reduce<k256::U256>>::reduce_bytes(FieldBytes::from_slice(hash.as_slice()));
    let mut stream = nonce_stream(key, hash);

    debug!("signing digest {hash}");
    let mut attempt = 0u32;
    loop {
        attempt += 1;

        let mut candidate = FieldBytes::default();
        stream.fill_bytes(&mut candidate);
        let Some(k) = Option::<NonZeroScalar>::from(NonZeroScalar::from_repr(candidate)) else {
            trace!("attempt {attempt}: nonce candidate out of range");
            continue;
        };

        let point = (ProjectivePoint::GENERATOR * *k).to_affine();
        let Some(r) = Option::<NonZeroScalar>::from(NonZeroScalar::from_repr(point.x())) else {
            trace!("attempt {attempt}: r out of range");
            continue;
        };
        let Some(k_inv) = Option::<Scalar>::from(k.as_ref().invert()) else {
            continue;
        };

        let s = k_inv * (e + *r.as_ref() * d);
        if bool::from(s.is_zero()) {
            trace!("attempt {attempt}: s is zero");
            continue;
        }

        let v = point.y_is_odd().unwrap_u8();
        return Signature::from_components(
            U256::from_be_slice(&r.to_bytes()),
            U256::from_be_slice(&s.to_bytes()),
            v,
        );
    }
}

/// Keystream from which nonce candidates are drawn.
fn nonce_stream(key: &PrivateKey, hash: &B256) -> ChaCha20Rng {
    let mut hasher = Sha512::new();
    hasher.update(key.to_bytes());
    hasher.update(CURVE.nonce_salt);
    hasher.update(hash.as_slice());
    let digest = hasher.finalize();

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest[..32]);
    ChaCha20Rng::from_seed(seed)
}
