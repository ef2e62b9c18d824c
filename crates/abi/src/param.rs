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

use crate::error::EncodeError;

/// A parameter type of a contract function.
///
/// Only element types with a single-word encoding may appear inside an
/// [ParamType::Array]. Booleans, tuples, fixed-size arrays and aliases such as `uint`
/// are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    Address,
    /// `uintN`, `8 <= N <= 256`, `N % 8 == 0`.
    Uint(usize),
    /// `intN`, `8 <= N <= 256`, `N % 8 == 0`.
    Int(usize),
    /// `bytesN`, `1 <= N <= 32`.
    FixedBytes(usize),
    Bytes,
    String,
    /// `T[]`.
    Array(Box<ParamType>),
}

impl ParamType {
    /// Parses a canonical type string such as `uint256`, `bytes4` or `address[]`.
    pub fn parse(ty: &str) -> Result<Self, EncodeError> {
        let unsupported = || EncodeError::UnsupportedType(ty.to_string());

        if let Some(element) = ty.strip_suffix("[]") {
            let element = Self::parse_elementary(element).ok_or_else(unsupported)?;
            return match element {
                ParamType::Address
                | ParamType::Uint(_)
                | ParamType::Int(_)
                | ParamType::FixedBytes(_) => Ok(ParamType::Array(Box::new(element))),
                _ => Err(unsupported()),
            };
        }
        Self::parse_elementary(ty).ok_or_else(unsupported)
    }

    fn parse_elementary(ty: &str) -> Option<Self> {
        match ty {
            "address" => return Some(ParamType::Address),
            "bytes" => return Some(ParamType::Bytes),
            "string" => return Some(ParamType::String),
            _ => {}
        }
        if let Some(bits) = ty.strip_prefix("uint") {
            return parse_size(bits).filter(valid_int_width).map(ParamType::Uint);
        }
        if let Some(bits) = ty.strip_prefix("int") {
            return parse_size(bits).filter(valid_int_width).map(ParamType::Int);
        }
        if let Some(size) = ty.strip_prefix("bytes") {
            return parse_size(size)
                .filter(|size| (1..=32).contains(size))
                .map(ParamType::FixedBytes);
        }
        None
    }

    /// Whether values of this type live in the tail of the encoding.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            ParamType::Bytes | ParamType::String | ParamType::Array(_)
        )
    }
}

/// Parses a decimal size without sign or leading zeros.
fn parse_size(digits: &str) -> Option<usize> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    digits.parse().ok()
}

fn valid_int_width(bits: &usize) -> bool {
    (8..=256).contains(bits) && bits % 8 == 0
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => f.write_str("address"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::FixedBytes(size) => write!(f, "bytes{size}"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::String => f.write_str("string"),
            ParamType::Array(element) => write!(f, "{element}[]"),
        }
    }
}

impl FromStr for ParamType {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
