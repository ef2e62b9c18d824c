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

use alloy_primitives::{Bytes, Selector};
use log::debug;
use sigil_primitives::keccak;

use crate::{
    decode::decode,
    encode::encode_params,
    error::{DecodeError, EncodeError},
    param::ParamType,
    value::CallValue,
};

/// A contract function, parsed from its canonical signature `name(type0,type1,...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    name: String,
    inputs: Vec<ParamType>,
    signature: String,
    selector: Selector,
}

impl Function {
    /// Parses a canonical signature such as `transfer(address,uint256)`.
    pub fn parse(signature: &str) -> Result<Self, EncodeError> {
        let invalid = |reason| EncodeError::InvalidSignature {
            signature: signature.to_string(),
            reason,
        };

        if !signature
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_$(),[]".contains(c))
        {
            return Err(invalid("unexpected character"));
        }
        let (name, params) = signature
            .split_once('(')
            .ok_or_else(|| invalid("missing `(`"))?;
        let params = params
            .strip_suffix(')')
            .ok_or_else(|| invalid("missing closing `)`"))?;
        if params.contains(['(', ')']) {
            return Err(invalid("tuples are not supported"));
        }
        if name.is_empty() {
            return Err(invalid("empty name"));
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) || name.contains(['[', ']', ',']) {
            return Err(invalid("name is not an identifier"));
        }

        let inputs = if params.is_empty() {
            Vec::new()
        } else {
            params
                .split(',')
                .map(|ty| {
                    if ty.is_empty() {
                        Err(invalid("empty parameter"))
                    } else {
                        ParamType::parse(ty)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self::new(name, inputs))
    }

    /// Builds a function from its name and parameter types.
    pub fn new(name: impl Into<String>, inputs: Vec<ParamType>) -> Self {
        let name = name.into();
        let types = inputs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let signature = format!("{name}({types})");
        let selector = Selector::from(keccak::selector(&signature));
        Self {
            name,
            inputs,
            signature,
            selector,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    /// The canonical signature the selector is computed from.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// First four bytes of the Keccak-256 hash of the signature.
    pub fn selector(&self) -> Selector {
        self.selector
    }

    /// Encodes a call: `selector ‖ head ‖ tail`.
    pub fn try_encode_input(&self, values: &[CallValue]) -> Result<Bytes, EncodeError> {
        let params = encode_params(&self.inputs, values)?;
        let mut data = Vec::with_capacity(4 + params.len());
        data.extend_from_slice(self.selector.as_slice());
        data.extend_from_slice(&params);
        Ok(data.into())
    }

    /// Encodes a call.
    ///
    /// # Panics
    ///
    /// Panics if the values do not match the parameter types.
    pub fn encode_input(&self, values: &[CallValue]) -> Bytes {
        match self.try_encode_input(values) {
            Ok(data) => data,
            Err(err) => panic!("cannot encode call to `{}`: {err}", self.signature),
        }
    }

    /// Checks the selector of `calldata` and decodes the arguments that follow it.
    pub fn decode_input(&self, calldata: &[u8]) -> Result<Vec<CallValue>, DecodeError> {
        if calldata.len() < 4 {
            return Err(DecodeError::MissingSelector(calldata.len()));
        }
        let (selector, params) = calldata.split_at(4);
        let selector = Selector::from_slice(selector);
        if selector != self.selector {
            debug!("call data for {selector} does not match {}", self.signature);
            return Err(DecodeError::SelectorMismatch {
                expected: self.selector,
                got: selector,
            });
        }
        decode(&self.inputs, params)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature)
    }
}

impl FromStr for Function {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("transfer(address,uint256)", "a9059cbb")]
    #[case("balanceOf(address)", "70a08231")]
    #[case("approve(address,uint256)", "095ea7b3")]
    #[case("totalSupply()", "18160ddd")]
    fn selectors(#[case] signature: &str, #[case] selector: &str) {
        let function = Function::parse(signature).unwrap();
        assert_eq!(alloy_primitives::hex::encode(function.selector()), selector);
        assert_eq!(function.signature(), signature);
        assert_eq!(function.to_string(), signature);
    }

    #[test]
    fn parts() {
        let function: Function = "swap$_2(uint8[],bytes32,string)".parse().unwrap();
        assert_eq!(function.name(), "swap$_2");
        assert_eq!(
            function.inputs(),
            &[
                ParamType::Array(Box::new(ParamType::Uint(8))),
                ParamType::FixedBytes(32),
                ParamType::String,
            ]
        );
        assert_eq!(
            Function::new("swap$_2", function.inputs().to_vec()),
            function
        );
    }

    #[rstest]
    #[case("transfer(address, uint256)")]
    #[case("transfer")]
    #[case("transfer(address")]
    #[case("(address)")]
    #[case("1transfer(address)")]
    #[case("transfer(address,,uint256)")]
    #[case("transfer(address,)")]
    #[case("transfer((address,uint256))")]
    #[case("transfer(address)x")]
    #[case("tränsfer(address)")]
    fn invalid(#[case] signature: &str) {
        assert!(matches!(
            Function::parse(signature),
            Err(EncodeError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn unsupported_types() {
        assert_eq!(
            Function::parse("f(bool)"),
            Err(EncodeError::UnsupportedType("bool".to_string()))
        );
        assert_eq!(
            Function::parse("f(uint)"),
            Err(EncodeError::UnsupportedType("uint".to_string()))
        );
    }

    #[test]
    fn decode_input_checks_selector() {
        let function = Function::parse("balanceOf(address)").unwrap();
        assert_eq!(
            function.decode_input(&[0x70, 0xa0]),
            Err(DecodeError::MissingSelector(2))
        );
        let mut calldata = vec![0u8; 36];
        calldata[..4].copy_from_slice(&[0xa9, 0x05, 0x9c, 0xbb]);
        assert!(matches!(
            function.decode_input(&calldata),
            Err(DecodeError::SelectorMismatch { .. })
        ));
    }
}
