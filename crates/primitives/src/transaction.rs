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

use alloy_primitives::{Address, Bytes, TxNumber, B256, U256};
use alloy_rlp::{Decodable, Encodable, EMPTY_STRING_CODE};
use anyhow::{bail, Context};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    consts::{CHAIN_ID, SIGNED_V_OFFSET},
    keccak::keccak256,
    recover::recover_address,
    rlp::{encode_list, encode_uint},
    signature::Signature,
    signer::HashSigner,
};

/// Errors of parsing a signed transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("rlp: {0}")]
    Rlp(#[from] alloy_rlp::Error),
    #[error("expected an rlp list")]
    NotAList,
    #[error("unsupported v {0}, expected 37 or 38")]
    UnsupportedV(u64),
    #[error("recipient must be empty or 20 bytes, got {0}")]
    InvalidRecipient(usize),
    #[error("{0} trailing bytes")]
    TrailingBytes(usize),
}

/// Represents the type of a transaction: either a contract creation or a call to an
/// existing account.
///
/// This avoids using an [Option] for the recipient because options get RLP encoded
/// into lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Contract creation; the recipient is encoded as the empty string.
    #[default]
    Create,
    /// Message call to the given address.
    Call(Address),
}

impl From<TransactionKind> for Option<Address> {
    fn from(value: TransactionKind) -> Self {
        match value {
            TransactionKind::Create => None,
            TransactionKind::Call(addr) => Some(addr),
        }
    }
}

impl From<Option<Address>> for TransactionKind {
    fn from(value: Option<Address>) -> Self {
        value.map_or(TransactionKind::Create, TransactionKind::Call)
    }
}

impl Encodable for TransactionKind {
    #[inline]
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        match self {
            TransactionKind::Call(addr) => addr.encode(out),
            TransactionKind::Create => out.put_u8(EMPTY_STRING_CODE),
        }
    }

    #[inline]
    fn length(&self) -> usize {
        match self {
            TransactionKind::Call(addr) => addr.length(),
            TransactionKind::Create => 1,
        }
    }
}

/// A legacy transaction with replay protection bound to [CHAIN_ID].
///
/// `from` and `signature` are metadata filled in by [LegacyTransaction::sign] and
/// [LegacyTransaction::decode_signed]; they never enter the signed pre-image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegacyTransaction {
    /// Number of transactions previously sent by the sender.
    pub nonce: TxNumber,
    /// Price in wei per unit of gas.
    pub gas_price: U256,
    /// Maximum amount of gas the transaction may consume.
    pub gas_limit: U256,
    /// Recipient, or [TransactionKind::Create] for contract creation.
    pub to: TransactionKind,
    /// Amount in wei transferred to the recipient.
    pub value: U256,
    /// Call data or init code.
    pub data: Bytes,
    /// Sender, once known.
    #[serde(default)]
    pub from: Option<Address>,
    /// Signature, once known.
    #[serde(default)]
    pub signature: Option<Signature>,
}

impl LegacyTransaction {
    /// Computes the length of the concatenated field encodings.
    pub fn payload_length(&self) -> usize {
        self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + self.to.length()
            + self.value.length()
            + self.data.length()
    }

    /// Encodes the fields in order, concatenated and not wrapped in a list.
    pub fn encode_fields(&self, out: &mut Vec<u8>) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.data.encode(out);
    }

    /// Returns the field encodings, concatenated and not wrapped in a list.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload_length());
        self.encode_fields(&mut out);
        out
    }

    /// Returns the pre-image that is hashed for signing:
    /// `rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0])`.
    pub fn signing_data(&self) -> Vec<u8> {
        let mut payload = self.encode();
        encode_uint(U256::from(CHAIN_ID), &mut payload);
        payload.push(EMPTY_STRING_CODE);
        payload.push(EMPTY_STRING_CODE);

        let mut out = Vec::with_capacity(payload.len() + 9);
        encode_list(&payload, &mut out);
        out
    }

    /// Returns the digest to sign.
    pub fn hash_to_sign(&self) -> B256 {
        keccak256(self.signing_data())
    }

    /// Returns the signed wire form:
    /// `rlp([nonce, gasPrice, gasLimit, to, value, data, v + 37, r, s])`.
    pub fn encode_signed(&self, signature: &Signature) -> Bytes {
        let mut payload = self.encode();
        encode_uint(
            U256::from(u64::from(signature.v) + SIGNED_V_OFFSET),
            &mut payload,
        );
        encode_uint(signature.r, &mut payload);
        encode_uint(signature.s, &mut payload);

        let mut out = Vec::with_capacity(payload.len() + 9);
        encode_list(&payload, &mut out);
        out.into()
    }

    /// Signs the transaction and returns its wire form.
    ///
    /// The fresh signature is recovered and checked against the signer's address and,
    /// if given, `expected_from`. On success `from` and `signature` are recorded.
    pub fn sign<S: HashSigner + ?Sized>(
        &mut self,
        signer: &S,
        expected_from: Option<Address>,
    ) -> anyhow::Result<Bytes> {
        let hash = self.hash_to_sign();
        let signer_address = signer.address();
        debug!("signing transaction {hash} as {signer_address}");

        let signature = signer
            .sign_hash(&hash)
            .context("failed to sign transaction")?;
        let recovered =
            recover_address(&signature, &hash).context("fresh signature does not recover")?;

        if recovered != signer_address {
            warn!("signature recovers to {recovered}, signer is {signer_address}");
            bail!("signature recovers to {recovered}, expected signer {signer_address}");
        }
        if let Some(expected) = expected_from {
            if recovered != expected {
                warn!("signature recovers to {recovered}, expected sender is {expected}");
                bail!("signature recovers to {recovered}, expected sender {expected}");
            }
        }

        self.from = Some(recovered);
        self.signature = Some(signature);
        Ok(self.encode_signed(&signature))
    }

    /// Parses the signed wire form.
    ///
    /// The returned transaction carries the signature; `from` is left empty, see
    /// [LegacyTransaction::recover_from].
    pub fn decode_signed(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut buf = bytes;
        let header = alloy_rlp::Header::decode(&mut buf)?;
        if !header.list {
            return Err(TransactionError::NotAList);
        }
        if buf.len() < header.payload_length {
            return Err(alloy_rlp::Error::InputTooShort.into());
        }
        if buf.len() > header.payload_length {
            return Err(TransactionError::TrailingBytes(
                buf.len() - header.payload_length,
            ));
        }

        let nonce = TxNumber::decode(&mut buf)?;
        let gas_price = U256::decode(&mut buf)?;
        let gas_limit = U256::decode(&mut buf)?;
        let to = match Bytes::decode(&mut buf)? {
            to if to.is_empty() => TransactionKind::Create,
            to if to.len() == 20 => TransactionKind::Call(Address::from_slice(&to)),
            to => return Err(TransactionError::InvalidRecipient(to.len())),
        };
        let value = U256::decode(&mut buf)?;
        let data = Bytes::decode(&mut buf)?;
        let v = u64::decode(&mut buf)?;
        let r = U256::decode(&mut buf)?;
        let s = U256::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(TransactionError::TrailingBytes(buf.len()));
        }

        let v = match v.checked_sub(SIGNED_V_OFFSET) {
            Some(parity @ (0 | 1)) => parity as u8,
            _ => {
                debug!("rejecting signed transaction with v = {v}");
                return Err(TransactionError::UnsupportedV(v));
            }
        };

        Ok(Self {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            from: None,
            signature: Some(Signature { r, s, v }),
        })
    }

    /// Recovers the sender from the attached signature.
    pub fn recover_from(&self) -> anyhow::Result<Address> {
        let signature = self.signature.context("transaction is not signed")?;
        recover_address(&signature, &self.hash_to_sign()).context("invalid signature")
    }

    /// Returns the keccak hash of the signed wire form, if a signature is attached.
    pub fn hash(&self) -> Option<B256> {
        self.signature
            .map(|signature| keccak256(self.encode_signed(&signature)))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, uint};
    use hex_literal::hex;
    use serde_json::json;

    use super::*;
    use crate::keys::PrivateKey;

    fn eip155_example() -> LegacyTransaction {
        LegacyTransaction {
            nonce: 9,
            gas_price: uint!(20_000_000_000_U256),
            gas_limit: uint!(21000_U256),
            to: TransactionKind::Call(address!("3535353535353535353535353535353535353535")),
            value: uint!(1_000_000_000_000_000_000_U256),
            data: Bytes::new(),
            ..Default::default()
        }
    }

    #[test]
    fn eip155_signing_data() {
        let tx = eip155_example();
        assert_eq!(
            tx.signing_data(),
            hex!(
                "ec098504a817c800825208943535353535353535353535353535353535353535"
                "880de0b6b3a764000080018080"
            )
        );
        assert_eq!(
            tx.hash_to_sign(),
            b256!("daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53")
        );
    }

    #[test]
    fn eip155_signed() {
        let tx = eip155_example();
        let signature = Signature {
            r: uint!(0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276_U256),
            s: uint!(0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83_U256),
            v: 0,
        };
        let signed = tx.encode_signed(&signature);
        assert_eq!(
            signed.as_ref(),
            hex!("f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83")
        );

        let decoded = LegacyTransaction::decode_signed(&signed).unwrap();
        assert_eq!(decoded.signature, Some(signature));
        assert_eq!(
            LegacyTransaction {
                signature: None,
                ..decoded.clone()
            },
            tx
        );
        assert_eq!(
            decoded.recover_from().unwrap(),
            address!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f")
        );
    }

    #[test]
    fn mainnet_transaction() {
        // Tx: 0x4540eb9c46b1654c26353ac3c65e56451f711926982ce1b02f15c50e7459caf7
        let tx: LegacyTransaction = serde_json::from_value(json!({
            "nonce": 537760,
            "gas_price": "0x03c49bfa04",
            "gas_limit": "0x019a28",
            "to": { "Call": "0xf0ee707731d1be239f9f482e1b2ea5384c0c426f" },
            "value": "0x06df842eaa9fb800",
            "data": "0x",
            "signature": {
                "v": 1,
                "r": "0xcadd790a37b78e5613c8cf44dc3002e3d7f06a5325d045963c708efe3f9fdf7a",
                "s": "0x1f63adb9a2d5e020c6aa0ff64695e25d7d9a780ed8471abe716d2dc0bf7d4259"
            }
        }))
        .unwrap();

        // verify that bincode serialization works
        let decoded: LegacyTransaction =
            bincode::deserialize(&bincode::serialize(&tx).unwrap()).unwrap();
        assert_eq!(decoded, tx);

        assert_eq!(
            tx.hash(),
            Some(b256!("4540eb9c46b1654c26353ac3c65e56451f711926982ce1b02f15c50e7459caf7"))
        );
        assert_eq!(
            tx.recover_from().unwrap(),
            address!("974caa59e49682cda0ad2bbe82983419a2ecc400")
        );
    }

    #[test]
    fn sign_records_metadata() {
        let key = PrivateKey::from_bytes(&[0x46; 32]).unwrap();
        let mut tx = eip155_example();

        let signed = tx.sign(&key, Some(key.address())).unwrap();
        assert_eq!(tx.from, Some(key.address()));
        let signature = tx.signature.unwrap();
        assert_eq!(signed, tx.encode_signed(&signature));
        assert_eq!(tx.hash(), Some(keccak256(&signed)));

        // signing is deterministic
        let mut again = eip155_example();
        assert_eq!(again.sign(&key, None).unwrap(), signed);

        let decoded = LegacyTransaction::decode_signed(&signed).unwrap();
        assert_eq!(decoded.recover_from().unwrap(), key.address());
    }

    #[test]
    fn sign_rejects_unexpected_sender() {
        let key = PrivateKey::from_bytes(&[0x46; 32]).unwrap();
        let mut tx = eip155_example();
        let err = tx
            .sign(&key, Some(address!("0000000000000000000000000000000000000001")))
            .unwrap_err();
        assert!(err.to_string().contains("expected sender"));
        assert_eq!(tx.from, None);
        assert_eq!(tx.signature, None);
    }

    #[test]
    fn sign_rejects_lying_signer() {
        struct Impostor(PrivateKey);

        impl HashSigner for Impostor {
            fn address(&self) -> Address {
                address!("00000000000000000000000000000000000000aa")
            }

            fn sign_hash(&self, hash: &B256) -> anyhow::Result<Signature> {
                self.0.sign_hash(hash)
            }
        }

        let signer = Impostor(PrivateKey::from_bytes(&[0x46; 32]).unwrap());
        let mut tx = eip155_example();
        assert!(tx.sign(&signer, None).is_err());
    }

    #[test]
    fn contract_creation() {
        let key = PrivateKey::from_bytes(&[0x07; 32]).unwrap();
        let mut tx = LegacyTransaction {
            nonce: 0,
            gas_price: U256::from(1),
            gas_limit: U256::from(100_000),
            to: TransactionKind::Create,
            value: U256::ZERO,
            data: Bytes::from_static(&hex!("6080604052")),
            ..Default::default()
        };
        assert_eq!(tx.encode(), hex!("8001830186a08080856080604052"));

        let signed = tx.sign(&key, None).unwrap();
        let decoded = LegacyTransaction::decode_signed(&signed).unwrap();
        assert_eq!(decoded.to, TransactionKind::Create);
        assert_eq!(decoded.data, tx.data);
        assert_eq!(decoded.recover_from().unwrap(), key.address());
    }

    #[test]
    fn decode_errors() {
        let signed = eip155_example().encode_signed(&Signature {
            r: U256::from(1),
            s: U256::from(1),
            v: 0,
        });

        let mut trailing = signed.to_vec();
        trailing.push(0x00);
        assert_eq!(
            LegacyTransaction::decode_signed(&trailing),
            Err(TransactionError::TrailingBytes(1))
        );

        assert_eq!(
            LegacyTransaction::decode_signed(&signed[..signed.len() - 1]),
            Err(TransactionError::Rlp(alloy_rlp::Error::InputTooShort))
        );

        assert_eq!(
            LegacyTransaction::decode_signed(&hex!("8180")),
            Err(TransactionError::NotAList)
        );

        // legacy v = 27 is not accepted
        let mut payload = eip155_example().encode();
        encode_uint(U256::from(27), &mut payload);
        encode_uint(U256::from(1), &mut payload);
        encode_uint(U256::from(1), &mut payload);
        let mut out = Vec::new();
        encode_list(&payload, &mut out);
        assert_eq!(
            LegacyTransaction::decode_signed(&out),
            Err(TransactionError::UnsupportedV(27))
        );

        // 19-byte recipient
        let mut payload = Vec::new();
        for field in [9u64, 1, 1] {
            field.encode(&mut payload);
        }
        [0x35u8; 19].as_slice().encode(&mut payload);
        Bytes::new().encode(&mut payload);
        Bytes::new().encode(&mut payload);
        for field in [37u64, 1, 1] {
            field.encode(&mut payload);
        }
        let mut out = Vec::new();
        encode_list(&payload, &mut out);
        assert_eq!(
            LegacyTransaction::decode_signed(&out),
            Err(TransactionError::InvalidRecipient(19))
        );
    }

    #[test]
    fn unsigned_has_no_hash() {
        let tx = eip155_example();
        assert_eq!(tx.hash(), None);
        assert!(tx.recover_from().is_err());
    }
}
