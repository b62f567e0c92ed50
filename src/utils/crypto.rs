// JWT minting for service credentials

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// JWT signing algorithms supported by the generic JWT functions
#[derive(Debug, Clone, Copy)]
pub enum JwtAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256 (asymmetric key)
    RS256,
}

/// Helper function to create a JWT header for the given algorithm
#[must_use]
pub fn create_jwt_header(algorithm: &JwtAlgorithm) -> serde_json::Value {
    let alg_str = match algorithm {
        JwtAlgorithm::RS256 => "RS256",
    };

    serde_json::json!({
        "alg": alg_str,
        "typ": "JWT"
    })
}

/// Generic JWT creation function
///
/// # Arguments
///
/// * `header` - JWT header as a JSON value
/// * `payload` - JWT payload/claims as a JSON value
/// * `algorithm` - The signing algorithm to use
/// * `key_material` - PEM-encoded PKCS#8 private key for RS256
///
/// # Errors
///
/// Returns an error if:
/// - JSON serialization fails
/// - Key parsing fails
/// - Signing operation fails
pub fn create_jwt(
    header: &serde_json::Value,
    payload: &serde_json::Value,
    algorithm: JwtAlgorithm,
    key_material: &[u8],
) -> Result<String> {
    let header_json = serde_json::to_string(header).context("Failed to serialize JWT header")?;
    let payload_json =
        serde_json::to_string(payload).context("Failed to serialize JWT payload")?;

    let header_b64 = URL_SAFE_NO_PAD.encode(header_json.as_bytes());
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());

    let message = format!("{header_b64}.{payload_b64}");

    let signature_bytes = match algorithm {
        JwtAlgorithm::RS256 => {
            let key_pem = std::str::from_utf8(key_material)
                .context("RS256 key material must be valid UTF-8 PEM")?;
            sign_jwt_rs256(message.as_bytes(), key_pem)?
        }
    };

    let signature_b64 = URL_SAFE_NO_PAD.encode(&signature_bytes);

    Ok(format!("{message}.{signature_b64}"))
}

/// Sign a message using RSASSA-PKCS1-v1_5 with SHA-256 (RS256)
///
/// # Errors
///
/// Returns an error if:
/// - Private key parsing fails
/// - Signing operation fails
fn sign_jwt_rs256(message: &[u8], private_key_pem: &str) -> Result<Vec<u8>> {
    use rsa::pkcs1v15::SigningKey;
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::sha2::Sha256;
    use rsa::signature::{SignatureEncoding, Signer};

    let private_key = rsa::RsaPrivateKey::from_pkcs8_pem(private_key_pem)
        .map_err(|e| anyhow!("Failed to parse RSA private key: {e:?}"))?;

    let signing_key = SigningKey::<Sha256>::new(private_key);
    let signature = signing_key.sign(message);
    Ok(signature.to_bytes().to_vec())
}
