//! Base64 (RFC 4648, standard alphabet, `=` padded) for entry names,
//! contents and metadata.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{MparError, MparResult};

pub fn encode(data: impl AsRef<[u8]>) -> String {
    BASE64.encode(data)
}

/// Decode `text`, failing on a length that is not a multiple of four or on
/// a character outside the alphabet.
pub fn decode(text: &str) -> MparResult<Vec<u8>> {
    if text.len() % 4 != 0 {
        return Err(MparError::InvalidArgument(format!(
            "base64 length {} is not a multiple of 4", text.len()
        )));
    }
    BASE64
        .decode(text)
        .map_err(|e| MparError::InvalidArgument(format!("invalid base64: {e}")))
}

/// Decode a base64 field that must carry UTF-8 text (entry names, metadata).
pub(crate) fn decode_string(field: &str, text: &str) -> MparResult<String> {
    let bytes = decode(text)
        .map_err(|e| MparError::not_archive(format!("field {field:?}: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|_| MparError::not_archive(format!("field {field:?} is not UTF-8")))
}
