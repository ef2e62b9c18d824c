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
use log::debug;

use crate::{encode::WORD, error::DecodeError, param::ParamType, value::CallValue};

/// Decodes arguments of the given types from `data` (no selector).
///
/// Offsets of dynamic values are relative to the start of `data`. Every read is
/// bounds-checked; the first violation is returned.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<CallValue>, DecodeError> {
    types
        .iter()
        .enumerate()
        .map(|(index, ty)| decode_param(index, ty, data))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|err| debug!("failed to decode {} arguments: {err}", types.len()))
}

/// Decodes into pre-typed slots, see [CallValue::param_type].
///
/// The slots are only written when every argument decodes.
pub fn decode_into(slots: &mut [CallValue], data: &[u8]) -> Result<(), DecodeError> {
    let types = slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.param_type().ok_or(DecodeError::UnsupportedType {
                index,
                ty: slot.kind(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let values = decode(&types, data)?;
    for (slot, value) in slots.iter_mut().zip(values) {
        *slot = value;
    }
    Ok(())
}

fn decode_param(index: usize, ty: &ParamType, data: &[u8]) -> Result<CallValue, DecodeError> {
    let head = read_word(data, WORD * index, index)?;
    if !ty.is_dynamic() {
        return decode_static(index, ty, &head);
    }

    let offset = U256::from_be_bytes(head);
    let offset = usize::try_from(offset)
        .ok()
        .filter(|offset| *offset <= data.len())
        .ok_or(DecodeError::InvalidOffset { index, offset })?;
    let len = U256::from_be_bytes(read_word(data, offset, index)?);

    // read_word guarantees start <= data.len()
    let start = offset + WORD;
    let byte_len = match ty {
        ParamType::Array(_) => len.checked_mul(U256::from(WORD)),
        _ => Some(len),
    };
    let content = byte_len
        .and_then(|byte_len| usize::try_from(byte_len).ok())
        .filter(|byte_len| *byte_len <= data.len() - start)
        .map(|byte_len| &data[start..start + byte_len])
        .ok_or(DecodeError::InvalidLength { index, offset, len })?;

    match ty {
        ParamType::Bytes => Ok(CallValue::Bytes(Bytes::copy_from_slice(content))),
        ParamType::String => String::from_utf8(content.to_vec())
            .map(CallValue::String)
            .map_err(|_| DecodeError::InvalidUtf8 { index }),
        ParamType::Array(element) => decode_array(index, element, content),
        _ => Err(DecodeError::UnsupportedType {
            index,
            ty: "dynamic",
        }),
    }
}

fn decode_static(
    index: usize,
    ty: &ParamType,
    word: &[u8; WORD],
) -> Result<CallValue, DecodeError> {
    match ty {
        // the upper 12 bytes are not checked
        ParamType::Address => Ok(CallValue::Address(Address::from_slice(&word[12..]))),
        ParamType::Uint(_) => Ok(CallValue::Uint(U256::from_be_bytes(*word))),
        ParamType::Int(_) => Ok(CallValue::Int(I256::from_raw(U256::from_be_bytes(*word)))),
        ParamType::FixedBytes(size @ 1..=WORD) => {
            Ok(CallValue::FixedBytes(Bytes::copy_from_slice(&word[..*size])))
        }
        _ => Err(DecodeError::UnsupportedType {
            index,
            ty: "static",
        }),
    }
}

fn decode_array(
    index: usize,
    element: &ParamType,
    content: &[u8],
) -> Result<CallValue, DecodeError> {
    let words = content.chunks_exact(WORD);
    match element {
        ParamType::Address => Ok(CallValue::AddressArray(
            words.map(|word| Address::from_slice(&word[12..])).collect(),
        )),
        ParamType::Uint(_) => Ok(CallValue::UintArray(
            words.map(U256::from_be_slice).collect(),
        )),
        ParamType::Int(_) => Ok(CallValue::IntArray(
            words
                .map(|word| I256::from_raw(U256::from_be_slice(word)))
                .collect(),
        )),
        ParamType::FixedBytes(size @ 1..=WORD) => Ok(CallValue::FixedBytesArray(
            words
                .map(|word| Bytes::copy_from_slice(&word[..*size]))
                .collect(),
        )),
        _ => Err(DecodeError::UnsupportedType {
            index,
            ty: "array element",
        }),
    }
}

fn read_word(data: &[u8], offset: usize, index: usize) -> Result<[u8; WORD], DecodeError> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .and_then(|word| word.try_into().ok())
        .ok_or(DecodeError::OutOfBounds {
            index,
            offset,
            len: WORD,
        })
}
