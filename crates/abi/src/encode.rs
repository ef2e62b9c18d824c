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

//! Head/tail argument encoding.
//!
//! Every argument occupies one 32-byte head word. Static values are stored in the
//! word itself. Dynamic values store the offset of their content, measured from the
//! start of the head, and the content (a length word followed by the elements or the
//! zero-padded bytes) is appended to the tail.

use alloy_primitives::{Address, Bytes, I256, U256};
use log::trace;

use crate::{error::EncodeError, function::Function, param::ParamType, value::CallValue};

/// Size of an encoding word.
pub const WORD: usize = 32;

/// Encodes a call to `signature` with `values`.
///
/// # Panics
///
/// Panics if the signature cannot be parsed or the values do not match it. Use
/// [try_encode_call] to get the error instead.
pub fn encode_call(signature: &str, values: &[CallValue]) -> Bytes {
    match try_encode_call(signature, values) {
        Ok(data) => data,
        Err(err) => panic!("cannot encode call to `{signature}`: {err}"),
    }
}

/// Encodes a call to `signature` with `values`: `selector ‖ head ‖ tail`.
pub fn try_encode_call(signature: &str, values: &[CallValue]) -> Result<Bytes, EncodeError> {
    Function::parse(signature)?.try_encode_input(values)
}

/// Encodes `values` as arguments of the given types, without a selector.
pub fn encode_params(types: &[ParamType], values: &[CallValue]) -> Result<Vec<u8>, EncodeError> {
    if types.len() != values.len() {
        return Err(EncodeError::ArgumentCount {
            expected: types.len(),
            got: values.len(),
        });
    }
    for (index, (ty, value)) in types.iter().zip(values).enumerate() {
        check(index, ty, value)?;
    }

    let head_len = WORD * values.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for value in values {
        match head_word(value) {
            Some(word) => head.extend_from_slice(&word),
            None => {
                head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
                encode_tail(value, &mut tail);
            }
        }
    }
    trace!(
        "encoded {} arguments: {head_len} head bytes, {} tail bytes",
        values.len(),
        tail.len()
    );

    head.extend_from_slice(&tail);
    Ok(head)
}

/// Checks that `value` can be encoded as `ty`.
fn check(index: usize, ty: &ParamType, value: &CallValue) -> Result<(), EncodeError> {
    let fits = match (ty, value) {
        (ParamType::Address, CallValue::Address(_)) => true,
        (ParamType::Uint(bits), CallValue::Uint(value)) => uint_fits(*value, *bits),
        (ParamType::Int(bits), CallValue::Int(value)) => int_fits(*value, *bits),
        (ParamType::FixedBytes(size), CallValue::FixedBytes(data)) => {
            return fixed_len(index, ty, *size, data);
        }
        (ParamType::Bytes, CallValue::Bytes(_)) => true,
        (ParamType::String, CallValue::String(_)) => true,
        (ParamType::Array(element), _) => match (element.as_ref(), value) {
            (ParamType::Address, CallValue::AddressArray(_)) => true,
            (ParamType::Uint(bits), CallValue::UintArray(values)) => {
                values.iter().all(|value| uint_fits(*value, *bits))
            }
            (ParamType::Int(bits), CallValue::IntArray(values)) => {
                values.iter().all(|value| int_fits(*value, *bits))
            }
            (ParamType::FixedBytes(size), CallValue::FixedBytesArray(values)) => {
                return values
                    .iter()
                    .try_for_each(|data| fixed_len(index, ty, *size, data));
            }
            _ => return Err(mismatch(index, ty, value)),
        },
        _ => return Err(mismatch(index, ty, value)),
    };
    if fits {
        Ok(())
    } else {
        Err(EncodeError::ValueTooWide {
            index,
            ty: ty.clone(),
        })
    }
}

fn mismatch(index: usize, ty: &ParamType, value: &CallValue) -> EncodeError {
    EncodeError::TypeMismatch {
        index,
        expected: ty.clone(),
        got: value.kind(),
    }
}

/// `bytesN` values must hold exactly `N` bytes.
fn fixed_len(index: usize, ty: &ParamType, size: usize, data: &[u8]) -> Result<(), EncodeError> {
    if data.len() == size {
        Ok(())
    } else {
        Err(EncodeError::FixedBytesLength {
            index,
            ty: ty.clone(),
            expected: size,
            got: data.len(),
        })
    }
}

fn uint_fits(value: U256, bits: usize) -> bool {
    value.bit_len() <= bits
}

/// Whether `value` lies in `[-2^(bits-1), 2^(bits-1))`.
fn int_fits(value: I256, bits: usize) -> bool {
    // all bits from bits-1 upwards must equal the sign bit
    let high = value.into_raw() >> (bits - 1);
    high.is_zero() || high == U256::MAX >> (bits - 1)
}

/// Returns the head word of a static value, `None` for dynamic values.
fn head_word(value: &CallValue) -> Option<[u8; WORD]> {
    match value {
        CallValue::Address(address) => Some(address_word(address)),
        CallValue::Uint(value) => Some(uint_word(*value)),
        CallValue::Int(value) => Some(int_word(*value)),
        CallValue::FixedBytes(data) => Some(fixed_word(data)),
        CallValue::Bytes(_)
        | CallValue::String(_)
        | CallValue::UintArray(_)
        | CallValue::IntArray(_)
        | CallValue::AddressArray(_)
        | CallValue::FixedBytesArray(_) => None,
    }
}

/// Appends the tail content of a dynamic value.
fn encode_tail(value: &CallValue, out: &mut Vec<u8>) {
    let count = value.element_count().unwrap_or_default();
    out.extend_from_slice(&uint_word(U256::from(count)));
    match value {
        CallValue::Bytes(data) => append_padded(data, out),
        CallValue::String(string) => append_padded(string.as_bytes(), out),
        CallValue::UintArray(values) => values
            .iter()
            .for_each(|value| out.extend_from_slice(&uint_word(*value))),
        CallValue::IntArray(values) => values
            .iter()
            .for_each(|value| out.extend_from_slice(&int_word(*value))),
        CallValue::AddressArray(values) => values
            .iter()
            .for_each(|address| out.extend_from_slice(&address_word(address))),
        CallValue::FixedBytesArray(values) => values
            .iter()
            .for_each(|data| out.extend_from_slice(&fixed_word(data))),
        CallValue::Address(_)
        | CallValue::Uint(_)
        | CallValue::Int(_)
        | CallValue::FixedBytes(_) => {}
    }
}

fn append_padded(data: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(data);
    let padding = (WORD - data.len() % WORD) % WORD;
    out.resize(out.len() + padding, 0);
}

fn uint_word(value: U256) -> [u8; WORD] {
    value.to_be_bytes::<WORD>()
}

fn int_word(value: I256) -> [u8; WORD] {
    value.into_raw().to_be_bytes::<WORD>()
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_slice());
    word
}

fn fixed_word(data: &[u8]) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[..data.len()].copy_from_slice(data);
    word
}
