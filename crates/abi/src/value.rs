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

use alloy_primitives::{Address, Bytes, I256, U256};

use crate::param::ParamType;

/// A typed argument of a contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallValue {
    Address(Address),
    Uint(U256),
    Int(I256),
    /// At most 32 bytes, left-aligned in its word.
    FixedBytes(Bytes),
    Bytes(Bytes),
    String(String),
    UintArray(Vec<U256>),
    IntArray(Vec<I256>),
    AddressArray(Vec<Address>),
    FixedBytesArray(Vec<Bytes>),
}

impl CallValue {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CallValue::Address(_) => "address",
            CallValue::Uint(_) => "uint",
            CallValue::Int(_) => "int",
            CallValue::FixedBytes(_) => "fixed bytes",
            CallValue::Bytes(_) => "bytes",
            CallValue::String(_) => "string",
            CallValue::UintArray(_) => "uint array",
            CallValue::IntArray(_) => "int array",
            CallValue::AddressArray(_) => "address array",
            CallValue::FixedBytesArray(_) => "fixed bytes array",
        }
    }

    /// Whether the value is encoded in the tail.
    pub fn is_dynamic(&self) -> bool {
        match self {
            CallValue::Address(_)
            | CallValue::Uint(_)
            | CallValue::Int(_)
            | CallValue::FixedBytes(_) => false,
            CallValue::Bytes(_)
            | CallValue::String(_)
            | CallValue::UintArray(_)
            | CallValue::IntArray(_)
            | CallValue::AddressArray(_)
            | CallValue::FixedBytesArray(_) => true,
        }
    }

    /// Number of elements (or bytes) written after the length word, for dynamic values.
    pub fn element_count(&self) -> Option<usize> {
        match self {
            CallValue::Address(_)
            | CallValue::Uint(_)
            | CallValue::Int(_)
            | CallValue::FixedBytes(_) => None,
            CallValue::Bytes(bytes) => Some(bytes.len()),
            CallValue::String(string) => Some(string.len()),
            CallValue::UintArray(values) => Some(values.len()),
            CallValue::IntArray(values) => Some(values.len()),
            CallValue::AddressArray(values) => Some(values.len()),
            CallValue::FixedBytesArray(values) => Some(values.len()),
        }
    }

    /// The type a slot holding this value decodes as.
    ///
    /// Integers decode as 256-bit. Fixed bytes keep their current length, which must
    /// be shared by every element of a fixed bytes array; an empty one decodes as
    /// `bytes32[]`.
    pub fn param_type(&self) -> Option<ParamType> {
        let fixed = |len: usize| (1..=32).contains(&len).then_some(ParamType::FixedBytes(len));
        Some(match self {
            CallValue::Address(_) => ParamType::Address,
            CallValue::Uint(_) => ParamType::Uint(256),
            CallValue::Int(_) => ParamType::Int(256),
            CallValue::FixedBytes(bytes) => fixed(bytes.len())?,
            CallValue::Bytes(_) => ParamType::Bytes,
            CallValue::String(_) => ParamType::String,
            CallValue::UintArray(_) => ParamType::Array(Box::new(ParamType::Uint(256))),
            CallValue::IntArray(_) => ParamType::Array(Box::new(ParamType::Int(256))),
            CallValue::AddressArray(_) => ParamType::Array(Box::new(ParamType::Address)),
            CallValue::FixedBytesArray(values) => {
                let len = values.first().map_or(32, |first| first.len());
                if values.iter().any(|value| value.len() != len) {
                    return None;
                }
                ParamType::Array(Box::new(fixed(len)?))
            }
        })
    }
}

impl From<Address> for CallValue {
    fn from(value: Address) -> Self {
        CallValue::Address(value)
    }
}

impl From<U256> for CallValue {
    fn from(value: U256) -> Self {
        CallValue::Uint(value)
    }
}

impl From<I256> for CallValue {
    fn from(value: I256) -> Self {
        CallValue::Int(value)
    }
}

impl From<String> for CallValue {
    fn from(value: String) -> Self {
        CallValue::String(value)
    }
}

impl From<&str> for CallValue {
    fn from(value: &str) -> Self {
        CallValue::String(value.to_string())
    }
}

impl From<Vec<U256>> for CallValue {
    fn from(value: Vec<U256>) -> Self {
        CallValue::UintArray(value)
    }
}

impl From<Vec<I256>> for CallValue {
    fn from(value: Vec<I256>) -> Self {
        CallValue::IntArray(value)
    }
}

impl From<Vec<Address>> for CallValue {
    fn from(value: Vec<Address>) -> Self {
        CallValue::AddressArray(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_counts() {
        assert_eq!(CallValue::Uint(U256::from(5)).element_count(), None);
        assert_eq!(CallValue::from("héllo").element_count(), Some(6));
        assert_eq!(
            CallValue::from(vec![Address::ZERO, Address::ZERO]).element_count(),
            Some(2)
        );
        assert_eq!(
            CallValue::Bytes(Bytes::from_static(&[1, 2, 3])).element_count(),
            Some(3)
        );
    }

    #[test]
    fn slot_types() {
        assert_eq!(
            CallValue::FixedBytes(Bytes::from_static(&[0; 4])).param_type(),
            Some(ParamType::FixedBytes(4))
        );
        assert_eq!(CallValue::FixedBytes(Bytes::new()).param_type(), None);
        assert_eq!(
            CallValue::FixedBytes(Bytes::from(vec![0; 33])).param_type(),
            None
        );
        assert_eq!(
            CallValue::FixedBytesArray(vec![]).param_type(),
            Some(ParamType::Array(Box::new(ParamType::FixedBytes(32))))
        );
        assert_eq!(
            CallValue::FixedBytesArray(vec![Bytes::from_static(b"a"), Bytes::from_static(b"abc")])
                .param_type(),
            None
        );
        assert_eq!(
            CallValue::Int(I256::ZERO).param_type(),
            Some(ParamType::Int(256))
        );
    }
}
