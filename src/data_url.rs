//! Self-contained `data:` URLs for generated and inline images

use crate::{Error, Result};
use base64::Engine as Base64Engine;
use percent_encoding::percent_decode_str;

/// A decoded `data:` URL
#[derive(Debug, Clone, PartialEq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Encode bytes as a base64 `data:` URL with the given MIME type
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, b64)
}

/// Encode PNG bytes as `data:image/png;base64,...`
pub fn encode_png(bytes: &[u8]) -> String {
    encode("image/png", bytes)
}

pub fn is_data_url(url: &str) -> bool {
    url.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Decode a `data:` URL. Both base64 and percent-encoded payloads are accepted.
pub fn decode(url: &str) -> Result<DataUrl> {
    if !is_data_url(url) {
        return Err(Error::DataUrlError("missing data: scheme".into()));
    }
    let rest = &url[5..];
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::DataUrlError("missing ',' separator".into()))?;

    let mut params = header.split(';');
    let mime = match params.next() {
        Some(m) if !m.is_empty() => m.to_ascii_lowercase(),
        _ => "text/plain".to_string(),
    };
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::DataUrlError(format!("bad base64 payload: {}", e)))?
    } else {
        percent_decode_str(payload).collect()
    };

    Ok(DataUrl { mime, bytes })
}
