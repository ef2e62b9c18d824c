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

use alloy_primitives::{Address, B256};
use k256::{
    elliptic_curve::{ops::Reduce, point::DecompressPoint, subtle::Choice},
    AffinePoint, FieldBytes, NonZeroScalar, ProjectivePoint, Scalar,
};
use log::debug;

use crate::{
    keys::PublicKey,
    signature::{Signature, SignatureError},
};

/// Recovers the public key that produced `signature` over `hash`.
pub fn recover_public_key(signature: &Signature, hash: &B256) -> Result<PublicKey, SignatureError> {
    signature.validate().inspect_err(|err| {
        debug!("rejecting signature {signature}: {err}");
    })?;

    let r_bytes = FieldBytes::from(signature.r.to_be_bytes::<32>());
    let s_bytes = FieldBytes::from(signature.s.to_be_bytes::<32>());
    let r = Option::<NonZeroScalar>::from(NonZeroScalar::from_repr(r_bytes))
        .ok_or(SignatureError::InvalidR(signature.r))?;
    let s = Option::<NonZeroScalar>::from(NonZeroScalar::from_repr(s_bytes))
        .ok_or(SignatureError::InvalidS(signature.s))?;

    // the nonce point: x = r, y chosen by parity
    let big_r = Option::<AffinePoint>::from(AffinePoint::decompress(
        &r_bytes,
        Choice::from(signature.v),
    ))
    .ok_or_else(|| {
        debug!("r {:#x} is not the x-coordinate of a curve point", signature.r);
        SignatureError::InvalidPoint
    })?;

    let e = <Scalar as Reduce<k256::U256>>::reduce_bytes(FieldBytes::from_slice(hash.as_slice()));
    let r_inv = Option::<Scalar>::from(r.as_ref().invert())
        .ok_or(SignatureError::InvalidR(signature.r))?;

    let q = (ProjectivePoint::from(big_r) * *s.as_ref() + ProjectivePoint::GENERATOR * -e) * r_inv;
    if q == ProjectivePoint::IDENTITY {
        debug!("signature {signature} recovers to the point at infinity");
        return Err(SignatureError::IdentityPoint);
    }

    Ok(PublicKey::from_affine(&q.to_affine()))
}

/// Recovers the address that produced `signature` over `hash`.
pub fn recover_address(signature: &Signature, hash: &B256) -> Result<Address, SignatureError> {
    Ok(recover_public_key(signature, hash)?.address())
}

/// Returns whether `signature` over `hash` recovers to `address`.
pub fn verify_hash(signature: &Signature, hash: &B256, address: Address) -> bool {
    matches!(recover_address(signature, hash), Ok(recovered) if recovered == address)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, uint, U256};
    use rand_chacha::ChaCha20Rng;
    use rand_core::{RngCore, SeedableRng};

    use super::*;
    use crate::{consts::CURVE, keys::PrivateKey, signer::sign_hash};

    #[test]
    fn eip155_example() {
        let hash = b256!("daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53");
        let signature = Signature {
            r: uint!(0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276_U256),
            s: uint!(0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83_U256),
            v: 0,
        };
        assert_eq!(
            recover_address(&signature, &hash).unwrap(),
            address!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f")
        );
        assert_eq!(
            recover_public_key(&signature, &hash).unwrap(),
            PrivateKey::from_bytes(&[0x46; 32]).unwrap().public_key()
        );
        assert!(verify_hash(
            &signature,
            &hash,
            address!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f")
        ));

        // the other parity yields a different key
        let flipped = Signature { v: 1, ..signature };
        assert!(!verify_hash(
            &flipped,
            &hash,
            address!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f")
        ));
    }

    #[test]
    fn sign_recover_identity() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x5167_11);
        for _ in 0..128 {
            let mut secret = [0u8; 32];
            rng.fill_bytes(&mut secret);
            let Ok(key) = PrivateKey::from_bytes(&secret) else {
                continue;
            };
            let mut hash = B256::ZERO;
            rng.fill_bytes(hash.as_mut_slice());

            let signature = sign_hash(&key, &hash);
            assert!(signature.s <= CURVE.half_order);
            assert_eq!(recover_address(&signature, &hash).unwrap(), key.address());
        }
    }

    #[test]
    fn out_of_range_components() {
        let hash = B256::repeat_byte(0x01);
        let good = sign_hash(&PrivateKey::from_bytes(&[0x46; 32]).unwrap(), &hash);

        let bad = Signature { v: 2, ..good };
        assert_eq!(
            recover_public_key(&bad, &hash),
            Err(SignatureError::InvalidRecoveryId(2))
        );
        let bad = Signature {
            r: U256::ZERO,
            ..good
        };
        assert_eq!(
            recover_public_key(&bad, &hash),
            Err(SignatureError::InvalidR(U256::ZERO))
        );
        let bad = Signature {
            r: CURVE.order,
            ..good
        };
        assert_eq!(
            recover_public_key(&bad, &hash),
            Err(SignatureError::InvalidR(CURVE.order))
        );
        let bad = Signature {
            s: CURVE.order - good.s,
            ..good
        };
        assert!(matches!(
            recover_public_key(&bad, &hash),
            Err(SignatureError::InvalidS(_))
        ));
        assert!(!verify_hash(&bad, &hash, Address::ZERO));
    }

    #[test]
    fn r_off_curve() {
        // x = 5 has no square root of x^3 + 7 on secp256k1
        let signature = Signature {
            r: U256::from(5),
            s: U256::from(1),
            v: 0,
        };
        assert_eq!(
            recover_public_key(&signature, &B256::repeat_byte(0x01)),
            Err(SignatureError::InvalidPoint)
        );
    }
}
