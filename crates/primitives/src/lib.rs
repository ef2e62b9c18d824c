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

pub mod consts;
pub mod keccak;
pub mod keys;
pub mod recover;
pub mod rlp;
pub mod signature;
pub mod signer;
pub mod transaction;

pub use alloy_primitives::{Address, Bytes, B256, I256, U256};

pub use crate::{
    keys::{KeyError, PrivateKey, PublicKey},
    recover::{recover_address, recover_public_key, verify_hash},
    signature::{Signature, SignatureError},
    signer::{sign_hash, HashSigner},
    transaction::{LegacyTransaction, TransactionError, TransactionKind},
};

/// Strips an optional `0x` prefix from a hex string.
pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
