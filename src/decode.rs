//! Text encoding detection for raw log buffers
//!
//! Log files reach us through different collection pipelines (`kubectl logs`
//! redirected from PowerShell, plain `tee`, CI artifact uploads), so the same
//! JSON-lines payload may arrive as UTF-8 with a byte-order mark, as UTF-16,
//! or as some single-byte code page.
//!
//! Each candidate encoding answers a capability query (`is_valid`) and the
//! first valid candidate in priority order wins. Decoding itself never
//! guesses: a candidate that reports valid decodes losslessly.

use serde::Serialize;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Encodings tried when decoding a log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// UTF-8, optionally preceded by a byte-order mark
    Utf8Sig,
    /// UTF-16 with optional BOM; little-endian when no BOM is present
    Utf16,
    /// ISO-8859-1, every byte maps to the code point of the same value
    Latin1,
}

impl TextEncoding {
    /// Default candidate order: strictest first, permissive fallback last
    pub const CANDIDATES: [TextEncoding; 3] = [
        TextEncoding::Utf8Sig,
        TextEncoding::Utf16,
        TextEncoding::Latin1,
    ];

    /// Short name used in diagnostics and reports
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Utf16 => "utf-16",
            TextEncoding::Latin1 => "latin-1",
        }
    }

    /// Whether `bytes` decode under this encoding without error
    pub fn is_valid(self, bytes: &[u8]) -> bool {
        match self {
            TextEncoding::Utf8Sig => std::str::from_utf8(strip_utf8_bom(bytes)).is_ok(),
            TextEncoding::Utf16 => match utf16_units(bytes) {
                Some(units) => char::decode_utf16(units).all(|c| c.is_ok()),
                None => false,
            },
            TextEncoding::Latin1 => true,
        }
    }

    /// Decode `bytes`, returning `None` if they are not valid in this encoding
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8Sig => std::str::from_utf8(strip_utf8_bom(bytes))
                .ok()
                .map(str::to_owned),
            TextEncoding::Utf16 => {
                let units: Vec<u16> = utf16_units(bytes)?.collect();
                String::from_utf16(&units).ok()
            }
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Decoded file contents together with the encoding that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub encoding: TextEncoding,
    pub text: String,
}

/// Pick the first candidate that reports `bytes` as valid
pub fn detect_encoding(bytes: &[u8], candidates: &[TextEncoding]) -> Option<TextEncoding> {
    candidates.iter().copied().find(|enc| enc.is_valid(bytes))
}

/// Detect and decode in one step
///
/// Returns `None` only when no candidate accepts the buffer. With the
/// default candidate list this cannot happen because Latin-1 accepts
/// every byte sequence.
pub fn decode_bytes(bytes: &[u8], candidates: &[TextEncoding]) -> Option<DecodedText> {
    let encoding = detect_encoding(bytes, candidates)?;
    let text = encoding.decode(bytes)?;
    Some(DecodedText { encoding, text })
}

fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&UTF8_BOM[..]).unwrap_or(bytes)
}

/// Split a UTF-16 buffer into code units, honouring and dropping a BOM
fn utf16_units(bytes: &[u8]) -> Option<impl Iterator<Item = u16> + '_> {
    if bytes.len() % 2 != 0 {
        return None;
    }

    let (body, big_endian) = if let Some(rest) = bytes.strip_prefix(&UTF16_BE_BOM[..]) {
        (rest, true)
    } else if let Some(rest) = bytes.strip_prefix(&UTF16_LE_BOM[..]) {
        (rest, false)
    } else {
        (bytes, false)
    };

    Some(body.chunks_exact(2).map(move |pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    }))
}
