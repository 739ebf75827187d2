pub mod document;
pub mod outline;
pub mod text;

pub use document::PdfDocument;
pub use outline::Bookmark;
pub use text::PageText;

use lopdf::{Object, StringFormat};

/// Decode a PDF text string (UTF-16BE with BOM, otherwise PDFDocEncoding).
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let u16_chars: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|chunk| {
                if chunk.len() == 2 {
                    Some(u16::from_be_bytes([chunk[0], chunk[1]]))
                } else {
                    None
                }
            })
            .collect();
        String::from_utf16_lossy(&u16_chars)
    } else {
        // PDFDocEncoding / Latin-1 (simplified)
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Encode a text string for a PDF dictionary. ASCII stays literal; anything
/// else becomes UTF-16BE with a BOM.
pub(crate) fn encode_pdf_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_encoding_round_trips_non_ascii() {
        let title = "Kapitel 3 – Größen";
        match encode_pdf_string(title) {
            Object::String(bytes, _) => assert_eq!(decode_pdf_string(&bytes), title),
            other => panic!("unexpected object: {:?}", other),
        }
    }

    #[test]
    fn test_ascii_stays_literal() {
        match encode_pdf_string("Chapter 1") {
            Object::String(bytes, StringFormat::Literal) => assert_eq!(bytes, b"Chapter 1"),
            other => panic!("unexpected object: {:?}", other),
        }
    }
}
