use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::CryptoError;

/// Encode bytes as unpadded base64url, the encoding used by JOSE.
pub fn b64url_encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode unpadded base64url.
pub fn b64url_decode(data: &str) -> Result<Vec<u8>, CryptoError> {
    URL_SAFE_NO_PAD
        .decode(data)
        .map_err(|e| CryptoError::InvalidInput(format!("invalid base64url: {}", e)))
}
