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

use alloy_primitives::{Selector, U256};
use thiserror::Error;

use crate::param::ParamType;

/// Caller errors: the signature or the values do not fit the calling convention.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("invalid function signature `{signature}`: {reason}")]
    InvalidSignature {
        signature: String,
        reason: &'static str,
    },
    #[error("unsupported parameter type `{0}`")]
    UnsupportedType(String),
    #[error("expected {expected} arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },
    #[error("argument {index}: expected {expected}, got {got}")]
    TypeMismatch {
        index: usize,
        expected: ParamType,
        got: &'static str,
    },
    #[error("argument {index}: value does not fit in {ty}")]
    ValueTooWide { index: usize, ty: ParamType },
    #[error("argument {index}: {ty} needs exactly {expected} bytes, got {got}")]
    FixedBytesLength {
        index: usize,
        ty: ParamType,
        expected: usize,
        got: usize,
    },
}

/// Data errors: the buffer does not hold what the destinations expect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("call data shorter than a selector: {0} bytes")]
    MissingSelector(usize),
    #[error("selector mismatch: expected {expected}, got {got}")]
    SelectorMismatch { expected: Selector, got: Selector },
    #[error("argument {index}: reading {len} bytes at offset {offset} overruns the buffer")]
    OutOfBounds {
        index: usize,
        offset: usize,
        len: usize,
    },
    #[error("argument {index}: offset {offset} points outside the buffer")]
    InvalidOffset { index: usize, offset: U256 },
    #[error("argument {index}: length {len} at offset {offset} overruns the buffer")]
    InvalidLength {
        index: usize,
        offset: usize,
        len: U256,
    },
    #[error("argument {index}: string is not valid UTF-8")]
    InvalidUtf8 { index: usize },
    #[error("argument {index}: unsupported destination type {ty}")]
    UnsupportedType { index: usize, ty: &'static str },
}
