//! Golden test vectors for deterministic verification.
//!
//! Digests and signatures here must match what Ethereum tooling produces for
//! the same inputs: `soliditySHA3` over the packed tuple, RFC 6979
//! deterministic ECDSA, low-s, `v` in `{27, 28}`.

use serde::{Deserialize, Serialize};

use claimdrop_core::{
    Address, Amount, ClaimAuthorization, DigestScheme, Nonce, TrustedSigner,
};

/// A golden test vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenVector {
    pub name: String,
    /// 32-byte secret, hex.
    pub secret: String,
    pub recipient: String,
    pub amount: Amount,
    pub nonce: Option<Nonce>,
    pub scheme: DigestScheme,

    // Expected outputs
    pub signer: String,
    pub digest: String,
    pub signature: String,
}

#[allow(clippy::too_many_arguments)]
fn vector(
    name: &str,
    secret: &str,
    recipient: &str,
    amount: Amount,
    nonce: Option<Nonce>,
    scheme: DigestScheme,
    signer: &str,
    digest: &str,
    signature: &str,
) -> GoldenVector {
    GoldenVector {
        name: name.to_string(),
        secret: secret.to_string(),
        recipient: recipient.to_string(),
        amount,
        nonce,
        scheme,
        signer: signer.to_string(),
        digest: digest.to_string(),
        signature: signature.to_string(),
    }
}

const SECRET_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
const SECRET_42: &str = "4242424242424242424242424242424242424242424242424242424242424242";

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        vector(
            "nonced tuple, raw digest",
            SECRET_ONE,
            "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF",
            124,
            Some(333),
            DigestScheme::Raw,
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
            "0x559aa4babd603e3c36474ac4ea9c37e65de1783d374d2543ef97228a496d3fb7",
            "0x2731cabeff594b7226830af58d70df1e2f4308023db49e28651700a9f4df344605b1dc8d5a824236cb32ec8e1aee41af1f7dd8e08920fc9e37e334696f792edb1b",
        ),
        vector(
            "nonced tuple, eth signed message",
            SECRET_ONE,
            "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF",
            124,
            Some(333),
            DigestScheme::EthSignedMessage,
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
            "0x2968df3fa968c8e5939ccfc19dae55e32fa57e4df6ab42043127860b6e1e2870",
            "0x8f618f792f7bd6f01310913d9a032240926db679149e2a53b1b951a0dcf2c6362cbfb4ea2af75bba66a8f3129ec93cb51bacd475fbb1371a53996c857147f6ea1b",
        ),
        vector(
            "legacy tuple, raw digest",
            SECRET_ONE,
            "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF",
            124,
            None,
            DigestScheme::Raw,
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
            "0x70c95d5ecb93b9a9d36293498c33f7b6e203d55f0a209105eb8835f870486756",
            "0xb00bbb04b1c1bbcf301bc48c1e59707f4f9d3d36710fd4bf32fcf2e77624f5d265b9b9674e03a91fdebe1f7450d7dfce812041bb5812ad068c612236c33528ba1c",
        ),
        vector(
            "full-width amount, zero nonce",
            SECRET_42,
            "0x1111111111111111111111111111111111111111",
            u128::MAX,
            Some(0),
            DigestScheme::Raw,
            "0x17c5185167401eD00cF5F5b2fc97D9BBfDb7D025",
            "0xc298668f71e25f99da391a6b38b6ff0014e01091c20f0d712c9cc171a95aa86a",
            "0x0b77320d256f85663d84b7aa0aeedeae0223fb7c867290d8ab60c10d5d8551fe7e00255ca5346ff201d95d349b0651c929839977ed6e67a696f0542abcec5a471c",
        ),
        vector(
            "legacy tuple, eth signed message",
            SECRET_42,
            "0xabababababababababababababababababababab",
            1,
            None,
            DigestScheme::EthSignedMessage,
            "0x17c5185167401eD00cF5F5b2fc97D9BBfDb7D025",
            "0xec64d143a09af530bbe824eacd314341fed84140c524cf7241c4acfadcdae2ba",
            "0xb12d04a13d942128da799901e8cdacbd8d98d666744e1f7c155978b697b3089d2a97b0b0381702ef87108c8d0d109ad306ca1511f1ac2a60c4278eafa52c0c5c1c",
        ),
    ]
}

/// The authorization a vector describes.
pub fn authorization_from_vector(vector: &GoldenVector) -> Result<ClaimAuthorization, String> {
    let recipient = Address::from_hex(&vector.recipient).map_err(|e| e.to_string())?;
    Ok(ClaimAuthorization {
        recipient,
        amount: vector.amount,
        nonce: vector.nonce,
    })
}

/// Recompute a vector's outputs, returning the first mismatch.
pub fn verify_vector(vector: &GoldenVector) -> Result<(), String> {
    let signer = TrustedSigner::from_secret_hex(&vector.secret).map_err(|e| e.to_string())?;
    let authorization = authorization_from_vector(vector)?;

    let signer_address = signer.address().to_checksum();
    if signer_address != vector.signer {
        return Err(format!("signer: got {}, expected {}", signer_address, vector.signer));
    }

    let digest = authorization.digest(vector.scheme).to_hex();
    if digest != vector.digest {
        return Err(format!("digest: got {}, expected {}", digest, vector.digest));
    }

    let voucher = signer
        .authorize(authorization, vector.scheme)
        .map_err(|e| e.to_string())?;
    let signature = voucher.signature.to_hex();
    if signature != vector.signature {
        return Err(format!("signature: got {}, expected {}", signature, vector.signature));
    }

    Ok(())
}

/// Verify every vector. Returns `(name, result)` pairs.
pub fn verify_all_vectors() -> Vec<(String, Result<(), String>)> {
    all_vectors()
        .iter()
        .map(|v| (v.name.clone(), verify_vector(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimdrop_core::RecoverableSignature;

    #[test]
    fn test_all_vectors_match() {
        for (name, result) in verify_all_vectors() {
            assert!(result.is_ok(), "vector '{}' failed: {:?}", name, result);
        }
    }

    #[test]
    fn test_vector_signatures_recover_signer() {
        for vector in all_vectors() {
            let authorization = authorization_from_vector(&vector).unwrap();
            let signature = RecoverableSignature::from_hex(&vector.signature).unwrap();
            let recovered = signature
                .recover(&authorization.digest(vector.scheme))
                .unwrap();
            assert_eq!(recovered.to_checksum(), vector.signer, "{}", vector.name);
        }
    }

    #[test]
    fn test_vectors_serialize() {
        let json = serde_json::to_string(&all_vectors()).unwrap();
        let back: Vec<GoldenVector> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), all_vectors().len());
    }
}
