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

//! Recursive length-prefix serialization used for transaction bodies.
//!
//! Scalars and byte strings follow the standard encoding. Lists are built from an
//! already serialized payload, with one deviation that existing signers depend on:
//! a list whose payload is exactly `[0x00]` is written as the empty string `0x80`.

use alloy_primitives::{Bytes, U256};
use alloy_rlp::{Encodable, EMPTY_STRING_CODE};
use serde::{Deserialize, Serialize};

/// A node of an RLP tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RlpItem {
    /// Unsigned integer, written as its minimal big-endian bytes.
    Uint(U256),
    /// Raw byte string.
    Bytes(Bytes),
    /// Nested list.
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// Appends the encoding of this item to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            RlpItem::Uint(value) => encode_uint(*value, out),
            RlpItem::Bytes(bytes) => encode_bytes(bytes, out),
            RlpItem::List(items) => {
                let mut payload = Vec::new();
                for item in items {
                    item.encode(&mut payload);
                }
                encode_list(&payload, out);
            }
        }
    }

    /// Returns the encoding of this item.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

impl From<u64> for RlpItem {
    fn from(value: u64) -> Self {
        RlpItem::Uint(U256::from(value))
    }
}

impl From<U256> for RlpItem {
    fn from(value: U256) -> Self {
        RlpItem::Uint(value)
    }
}

impl From<&[u8]> for RlpItem {
    fn from(value: &[u8]) -> Self {
        RlpItem::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<Vec<RlpItem>> for RlpItem {
    fn from(value: Vec<RlpItem>) -> Self {
        RlpItem::List(value)
    }
}

/// Encodes an unsigned integer; zero becomes `0x80`.
#[inline]
pub fn encode_uint(value: U256, out: &mut Vec<u8>) {
    value.encode(out);
}

/// Encodes a byte string.
#[inline]
pub fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    bytes.encode(out);
}

/// Wraps an already serialized `payload` as a list.
pub fn encode_list(payload: &[u8], out: &mut Vec<u8>) {
    if payload == [0x00] {
        out.push(EMPTY_STRING_CODE);
        return;
    }
    alloy_rlp::Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(out);
    out.extend_from_slice(payload);
}
