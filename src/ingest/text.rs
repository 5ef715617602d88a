//! Turns uploaded bytes into clean text: decoded, with no leading BOM, no NULs and `\n` line
//! endings.

use crate::error::IngestError;
use std::io::Read;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads the entire stream and normalizes it. Only an unreadable stream is an error; decoding
/// itself cannot fail.
pub fn read_text(mut reader: impl Read) -> Result<String, IngestError> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    Ok(normalize(&raw))
}

/// Decodes `raw` and normalizes the result.
///
/// UTF-8 (with or without a BOM) is tried first. If the bytes are not valid UTF-8 they are decoded
/// as Windows-1252, which maps every byte to a character.
pub fn normalize(raw: &[u8]) -> String {
    let without_bom = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
    let decoded = match std::str::from_utf8(without_bom) {
        Ok(s) => s.to_string(),
        Err(e) => {
            debug!(
                "Input is not UTF-8 (invalid byte at {}), decoding as Windows-1252",
                e.valid_up_to()
            );
            let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(without_bom);
            text.into_owned()
        }
    };
    normalize_text(&decoded)
}

/// Strips NUL characters and a leading BOM, and converts `\r\n` and lone `\r` to `\n`. A U+FEFF
/// anywhere else is part of the text and is kept.
pub(crate) fn normalize_text(s: &str) -> String {
    let s = s.strip_prefix('\u{feff}').unwrap_or(s);
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\0' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    let _ = chars.next();
                }
                out.push('\n');
            }
            c => out.push(c),
        }
    }
    out
}
