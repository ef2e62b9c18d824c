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

//! Network and curve constants.

use alloy_primitives::{uint, ChainId, U256};
use once_cell::sync::Lazy;

use crate::keccak::keccak;

/// The only network signed transactions are bound to.
pub const CHAIN_ID: ChainId = 1;

/// Offset added to the recovery id in the signed wire form: `35 + 2 * CHAIN_ID`.
pub const SIGNED_V_OFFSET: u64 = 35 + 2 * CHAIN_ID;

/// Order of the secp256k1 base point.
pub const SECP256K1_ORDER: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// Domain separation label hashed into the nonce-derivation salt.
pub const NONCE_SALT_LABEL: &[u8] = b"sigil/secp256k1/nonce-derivation/v1";

/// Curve parameters shared by signing and recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveParams {
    /// Group order `n`.
    pub order: U256,
    /// `n / 2`; canonical signatures have `s <= half_order`.
    pub half_order: U256,
    /// Salt mixed into every nonce seed.
    pub nonce_salt: [u8; 32],
}

/// Process-wide curve parameters, built on first use and never mutated.
pub static CURVE: Lazy<CurveParams> = Lazy::new(|| CurveParams {
    order: SECP256K1_ORDER,
    half_order: SECP256K1_ORDER >> 1_usize,
    nonce_salt: keccak(NONCE_SALT_LABEL),
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_order() {
        assert_eq!(
            CURVE.half_order,
            uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256)
        );
        assert_eq!(CURVE.half_order * U256::from(2) + U256::from(1), CURVE.order);
    }

    #[test]
    fn v_offset() {
        assert_eq!(SIGNED_V_OFFSET, 37);
    }
}
