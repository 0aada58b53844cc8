//! Decoding of plain-text documents (txt, md, json, csv).

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Latin1,
}

impl Encoding {
    /// Identify the encoding from a byte-order mark, falling back to UTF-8
    /// when the bytes validate and Latin-1 otherwise.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(UTF8_BOM) {
            Encoding::Utf8Bom
        } else if bytes.starts_with(UTF16_LE_BOM) {
            Encoding::Utf16Le
        } else if bytes.starts_with(UTF16_BE_BOM) {
            Encoding::Utf16Be
        } else if std::str::from_utf8(bytes).is_ok() {
            Encoding::Utf8
        } else {
            Encoding::Latin1
        }
    }

    pub fn bom_len(&self) -> usize {
        match self {
            Encoding::Utf8Bom => UTF8_BOM.len(),
            Encoding::Utf16Le | Encoding::Utf16Be => 2,
            Encoding::Utf8 | Encoding::Latin1 => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newline {
    Lf,
    Crlf,
}

/// What the decoder found in the original bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetadata {
    pub encoding: Encoding,
    pub newline: Newline,
}

impl TextMetadata {
    pub fn has_bom(&self) -> bool {
        self.encoding.bom_len() > 0
    }
}

/// Decode document bytes into text with `\n` line endings.
///
/// Invalid sequences are replaced rather than rejected.
pub fn decode_text(bytes: &[u8]) -> (String, TextMetadata) {
    let encoding = Encoding::sniff(bytes);
    let body = &bytes[encoding.bom_len()..];
    let text = match encoding {
        Encoding::Utf8 | Encoding::Utf8Bom => String::from_utf8_lossy(body).into_owned(),
        Encoding::Utf16Le => decode_utf16(body, u16::from_le_bytes),
        Encoding::Utf16Be => decode_utf16(body, u16::from_be_bytes),
        // Latin-1 bytes map one-to-one onto U+0000..U+00FF
        Encoding::Latin1 => body.iter().map(|&b| char::from(b)).collect(),
    };

    let (text, newline) = if text.contains("\r\n") {
        (text.replace("\r\n", "\n"), Newline::Crlf)
    } else {
        (text, Newline::Lf)
    };

    (text, TextMetadata { encoding, newline })
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| to_unit([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(text: &str, bom: &[u8], to_bytes: fn(u16) -> [u8; 2]) -> Vec<u8> {
        let mut content = bom.to_vec();
        for unit in text.encode_utf16() {
            content.extend_from_slice(&to_bytes(unit));
        }
        content
    }

    #[test]
    fn plain_ascii_is_utf8() {
        let (text, metadata) = decode_text(b"Hello, World!");
        assert_eq!(metadata.encoding, Encoding::Utf8);
        assert!(!metadata.has_bom());
        assert_eq!(text, "Hello, World!");
    }

    #[test]
    fn strips_utf8_bom() {
        let mut content = UTF8_BOM.to_vec();
        content.extend_from_slice("مرحبا".as_bytes());
        let (text, metadata) = decode_text(&content);
        assert_eq!(metadata.encoding, Encoding::Utf8Bom);
        assert!(metadata.has_bom());
        assert_eq!(text, "مرحبا");
    }

    #[test]
    fn decodes_utf16_le_with_crlf() {
        let content = utf16("Dose\r\n5 mg", UTF16_LE_BOM, u16::to_le_bytes);
        let (text, metadata) = decode_text(&content);
        assert_eq!(metadata.encoding, Encoding::Utf16Le);
        assert_eq!(metadata.newline, Newline::Crlf);
        assert_eq!(text, "Dose\n5 mg");
    }

    #[test]
    fn decodes_utf16_be() {
        let content = utf16("mg", UTF16_BE_BOM, u16::to_be_bytes);
        assert_eq!(decode_text(&content).0, "mg");
    }

    #[test]
    fn falls_back_to_latin1() {
        let (text, metadata) = decode_text(&[0x63, 0x61, 0x66, 0xE9]);
        assert_eq!(metadata.encoding, Encoding::Latin1);
        assert_eq!(text, "café");
    }

    #[test]
    fn normalizes_crlf_but_keeps_lone_cr() {
        let (text, metadata) = decode_text(b"Line1\r\nLine2\rstill2\r\n");
        assert_eq!(metadata.newline, Newline::Crlf);
        assert_eq!(text, "Line1\nLine2\rstill2\n");
    }
}
