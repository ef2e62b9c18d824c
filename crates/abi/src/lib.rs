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

//! Contract-call argument codec.
//!
//! A call is `selector ‖ head ‖ tail`, where the selector is the first four bytes of
//! the Keccak-256 hash of the canonical function signature.

pub mod decode;
pub mod encode;
pub mod error;
pub mod function;
pub mod param;
pub mod value;

pub use crate::{
    decode::{decode, decode_into},
    encode::{encode_call, encode_params, try_encode_call},
    error::{DecodeError, EncodeError},
    function::Function,
    param::ParamType,
    value::CallValue,
};
