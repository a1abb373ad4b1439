//! File-encoding auto-detection, carried over from the worker that used to
//! pull raw bytes off a persistent job queue: binary files are skipped
//! rather than embedded, and non-UTF-8 text is transcoded.

pub struct EncodingResult {
    pub content: String,
    pub encoding_name: String,
}

/// Detects `bytes`' encoding and returns its UTF-8 content, or `None` if the
/// file looks binary (contains NUL bytes, or decodes with replacement
/// characters under its best-guess encoding).
#[must_use]
pub fn detect_and_convert_to_utf8(bytes: &[u8]) -> Option<EncodingResult> {
    if bytes.contains(&0) {
        tracing::debug!("file contains NUL bytes, treating as binary");
        return None;
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(EncodingResult {
            content: text.to_string(),
            encoding_name: "UTF-8".to_string(),
        });
    }

    let (encoding, _bom_length) = encoding_rs::Encoding::for_bom(bytes).unwrap_or((encoding_rs::UTF_8, 0));
    let (decoded, actual_encoding, malformed) = encoding.decode(bytes);
    if malformed {
        tracing::debug!(
            "file appears to be binary (decoding errors under {})",
            actual_encoding.name()
        );
        return None;
    }

    Some(EncodingResult {
        content: decoded.into_owned(),
        encoding_name: actual_encoding.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_passes_through() {
        let result = detect_and_convert_to_utf8("hello world".as_bytes()).unwrap();
        assert_eq!(result.encoding_name, "UTF-8");
        assert_eq!(result.content, "hello world");
    }

    #[test]
    fn null_bytes_are_treated_as_binary() {
        assert!(detect_and_convert_to_utf8(&[0, 1, 2, 3]).is_none());
    }

    #[test]
    fn windows_1252_is_transcoded() {
        let bytes = [0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x93, 0x94]; // "Hello" + smart quotes
        let result = detect_and_convert_to_utf8(&bytes).unwrap();
        assert!(result.content.starts_with("Hello"));
    }
}
