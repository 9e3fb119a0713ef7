//! Packed ByteArray strings
//!
//! Layout inside an event payload:
//!
//! ```text
//! [n, full_word_1, ..., full_word_n, pending_word, pending_len]
//! ```
//!
//! Each full word carries 31 bytes, big-endian. The pending word carries the final
//! `pending_len` (< 31) bytes right-aligned. The decoded length is `31 * n + pending_len`.

use super::cursor::FeltCursor;
use crate::error::{ByteArrayFault, DecodeError};
use crate::felt::Felt;
use std::fmt;

/// Bytes carried by one full word
pub const BYTES_PER_WORD: usize = 31;

/// Largest accepted full-word count; anything above is treated as a misaligned schema
pub const MAX_FULL_WORDS: u64 = 1_000_000;

/// Why a single word produced an empty fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentFault {
    /// More significant bytes than a full word can hold
    TooWide(usize),
    /// Bytes are not valid UTF-8
    InvalidUtf8,
}

/// A word that was decoded as an empty fragment instead of failing the whole string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentError {
    /// Index of the word in the payload
    pub word_offset: usize,
    pub fault: FragmentFault,
}

impl fmt::Display for FragmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fault {
            FragmentFault::TooWide(len) => write!(
                f,
                "word {} has {} significant bytes (max {})",
                self.word_offset, len, BYTES_PER_WORD
            ),
            FragmentFault::InvalidUtf8 => {
                write!(f, "word {} is not valid UTF-8", self.word_offset)
            }
        }
    }
}

/// Result of decoding one ByteArray
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedByteArray {
    /// Assembled string; lossy fragments contribute nothing
    pub text: String,
    /// Fragments that were replaced by the empty string
    pub lossy: Vec<FragmentError>,
}

impl DecodedByteArray {
    pub fn is_lossless(&self) -> bool {
        self.lossy.is_empty()
    }
}

/// Decode the ByteArray whose header word is at the cursor
///
/// Reading the header consumes one position and the body advances `n + 2`, so on success the
/// cursor sits on the first word after the pending length. On error the cursor is left where
/// the failing read stopped and the caller should abandon the payload.
pub fn decode_byte_array(cursor: &mut FeltCursor<'_>) -> Result<DecodedByteArray, DecodeError> {
    let header_offset = cursor.position();
    let header = cursor.next("byte_array.len").map_err(|_| malformed(
        header_offset,
        ByteArrayFault::Truncated {
            needed: 3,
            available: 0,
        },
    ))?;

    let full_words = match header.to_u64() {
        Some(n) if n <= MAX_FULL_WORDS => n as usize,
        _ => {
            return Err(malformed(
                header_offset,
                ByteArrayFault::BadHeader(header.to_string()),
            ))
        }
    };

    let needed = full_words + 2;
    if cursor.remaining() < needed {
        return Err(malformed(
            header_offset,
            ByteArrayFault::Truncated {
                needed: needed + 1,
                available: cursor.remaining() + 1,
            },
        ));
    }

    let mut words = Vec::with_capacity(full_words);
    for _ in 0..full_words {
        let offset = cursor.position();
        words.push((offset, cursor.next("byte_array.word")?));
    }

    let pending_offset = cursor.position();
    let pending_word = cursor.next("byte_array.pending_word")?;
    let pending_len_word = cursor.next("byte_array.pending_len")?;

    let pending_len = match pending_len_word.to_u64() {
        Some(len) if (len as usize) < BYTES_PER_WORD => len as usize,
        _ => {
            return Err(malformed(
                pending_offset + 1,
                ByteArrayFault::PendingLenOutOfRange(pending_len_word.to_string()),
            ))
        }
    };

    // Characters may straddle word boundaries, so the words are validated as one byte string
    if let Some(text) = assemble(&words, pending_word, pending_len) {
        return Ok(DecodedByteArray {
            text,
            lossy: Vec::new(),
        });
    }

    let mut text = String::with_capacity(full_words * BYTES_PER_WORD);
    let mut lossy = Vec::new();

    for &(offset, word) in &words {
        match decode_full_word(word) {
            Ok(fragment) => text.push_str(&fragment),
            Err(fault) => lossy.push(FragmentError {
                word_offset: offset,
                fault,
            }),
        }
    }

    match decode_pending_word(pending_word, pending_len) {
        Ok(fragment) => text.push_str(&fragment),
        Err(fault) => lossy.push(FragmentError {
            word_offset: pending_offset,
            fault,
        }),
    }

    Ok(DecodedByteArray { text, lossy })
}

/// Concatenate every word's bytes; `None` if any word is too wide or the result is not UTF-8
fn assemble(words: &[(usize, Felt)], pending_word: Felt, pending_len: usize) -> Option<String> {
    let mut bytes = Vec::with_capacity(words.len() * BYTES_PER_WORD + pending_len);
    for &(_, word) in words {
        bytes.extend_from_slice(&full_word_bytes(word).ok()?);
    }
    bytes.extend_from_slice(&pending_bytes(pending_word, pending_len));
    String::from_utf8(bytes).ok()
}

fn full_word_bytes(word: Felt) -> Result<Vec<u8>, FragmentFault> {
    let bytes = word.to_bytes_be();
    let significant = &bytes[32 - word.byte_len()..];

    if significant.len() > BYTES_PER_WORD {
        return Err(FragmentFault::TooWide(significant.len()));
    }
    Ok(significant.to_vec())
}

/// `len` is authoritative: a zero word with a nonzero `len` yields `len` NUL bytes
fn pending_bytes(word: Felt, len: usize) -> Vec<u8> {
    if len == 0 {
        return Vec::new();
    }
    let bytes = word.to_bytes_be();
    bytes[32 - len..].to_vec()
}

/// Decode a full word on its own: big-endian bytes with leading zero bytes trimmed
pub fn decode_full_word(word: Felt) -> Result<String, FragmentFault> {
    String::from_utf8(full_word_bytes(word)?).map_err(|_| FragmentFault::InvalidUtf8)
}

/// Decode the low `len` bytes of the pending word on its own
pub fn decode_pending_word(word: Felt, len: usize) -> Result<String, FragmentFault> {
    String::from_utf8(pending_bytes(word, len)).map_err(|_| FragmentFault::InvalidUtf8)
}

/// Pack a string into the ByteArray layout
pub fn encode_byte_array(s: &str) -> Vec<Felt> {
    let bytes = s.as_bytes();
    let chunks = bytes.chunks_exact(BYTES_PER_WORD);
    let pending = chunks.remainder();

    let mut words = Vec::with_capacity(bytes.len() / BYTES_PER_WORD + 3);
    words.push(Felt::from((bytes.len() / BYTES_PER_WORD) as u64));
    for chunk in chunks {
        words.extend(Felt::from_bytes_be(chunk));
    }
    words.push(Felt::from_bytes_be(pending).unwrap_or_default());
    words.push(Felt::from(pending.len() as u64));
    words
}

fn malformed(offset: usize, fault: ByteArrayFault) -> DecodeError {
    DecodeError::MalformedByteArray { offset, fault }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(words: &[Felt]) -> Result<(DecodedByteArray, usize), DecodeError> {
        let mut cursor = FeltCursor::new(words);
        let decoded = decode_byte_array(&mut cursor)?;
        Ok((decoded, cursor.position()))
    }

    #[test]
    fn test_round_trip_word_boundaries() {
        for len in [0usize, 1, 30, 31, 32, 61, 62, 93] {
            let s: String = (0..len).map(|i| (b'a' + (i % 26) as u8) as char).collect();
            let words = encode_byte_array(&s);
            assert_eq!(words.len(), len / BYTES_PER_WORD + 3, "layout for len {}", len);

            let (decoded, end) = decode_all(&words).unwrap();
            assert_eq!(decoded.text, s, "len {}", len);
            assert!(decoded.is_lossless());
            assert_eq!(end, words.len());
        }
    }

    #[test]
    fn test_round_trip_multibyte_across_boundaries() {
        // Two- and three-byte characters starting on either side of each word edge
        for prefix in [29usize, 30, 31, 60, 61, 62] {
            for tail in ["é", "€", "日本", "ñandú"] {
                let s = format!("{}{}", "a".repeat(prefix), tail);
                let words = encode_byte_array(&s);

                let (decoded, end) = decode_all(&words).unwrap();
                assert_eq!(decoded.text, s, "prefix {} tail {}", prefix, tail);
                assert!(decoded.is_lossless(), "prefix {} tail {}", prefix, tail);
                assert_eq!(end, words.len());
            }
        }
    }

    #[test]
    fn test_split_character_with_bad_word_falls_back() {
        // "é" straddles word 1 and the pending word, with an invalid word between them
        let s = format!("{}é", "a".repeat(30));
        let mut words = encode_byte_array(&s);
        words[0] = Felt::from(2u64);
        let bad = Felt::from_bytes_be(&[0xff]).unwrap();
        words.insert(2, bad);
        let (decoded, _) = decode_all(&words).unwrap();

        assert!(!decoded.is_lossless());
        assert!(decoded
            .lossy
            .iter()
            .all(|f| f.fault == FragmentFault::InvalidUtf8));
        assert!(decoded.lossy.iter().any(|f| f.word_offset == 2));
    }

    #[test]
    fn test_cursor_lands_after_pending_len() {
        let mut words = vec![Felt::from(0xdeadu64)];
        words.extend(encode_byte_array("hello, starknet"));
        words.push(Felt::from(99u64));

        let mut cursor = FeltCursor::at(&words, 1);
        let decoded = decode_byte_array(&mut cursor).unwrap();

        assert_eq!(decoded.text, "hello, starknet");
        // n = 0: header + pending word + pending len
        assert_eq!(cursor.position(), 1 + 3);
        assert_eq!(cursor.next("trailer").unwrap(), Felt::from(99u64));
    }

    #[test]
    fn test_single_full_word_with_zero_pending() {
        let words = [
            Felt::from(1u64),
            Felt::from_short_string("A").unwrap(),
            Felt::ZERO,
            Felt::ZERO,
        ];
        let (decoded, end) = decode_all(&words).unwrap();
        assert_eq!(decoded.text, "A");
        assert_eq!(end, 4);
    }

    #[test]
    fn test_invalid_utf8_word_becomes_empty_fragment() {
        let words = [
            Felt::from(2u64),
            Felt::from_short_string("ab").unwrap(),
            Felt::from_bytes_be(&[0xff, 0xfe]).unwrap(),
            Felt::from_short_string("cd").unwrap(),
            Felt::from(2u64),
        ];
        let (decoded, end) = decode_all(&words).unwrap();

        assert_eq!(decoded.text, "abcd");
        assert_eq!(
            decoded.lossy,
            vec![FragmentError {
                word_offset: 2,
                fault: FragmentFault::InvalidUtf8
            }]
        );
        assert_eq!(end, words.len());
    }

    #[test]
    fn test_too_wide_word_is_lossy() {
        let wide = Felt::from_bytes_be(&[b'x'; 32]).unwrap();
        let words = [Felt::from(1u64), wide, Felt::ZERO, Felt::ZERO];
        let (decoded, _) = decode_all(&words).unwrap();

        assert_eq!(decoded.text, "");
        assert_eq!(decoded.lossy[0].fault, FragmentFault::TooWide(32));
    }

    #[test]
    fn test_zero_pending_word_with_nonzero_len() {
        let words = [Felt::ZERO, Felt::ZERO, Felt::from(3u64)];
        let (decoded, _) = decode_all(&words).unwrap();
        assert_eq!(decoded.text, "\0\0\0");
    }

    #[test]
    fn test_pending_uses_only_low_bytes() {
        // "XYab" with a declared length of 2 keeps "ab"
        let pending = Felt::from_short_string("XYab").unwrap();
        let words = [Felt::ZERO, pending, Felt::from(2u64)];
        let (decoded, _) = decode_all(&words).unwrap();
        assert_eq!(decoded.text, "ab");
    }

    #[test]
    fn test_bad_header() {
        let huge = Felt::from_hex("0x54686973206973206e6f742061206c656e677468").unwrap();
        let err = decode_all(&[huge, Felt::ZERO, Felt::ZERO]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedByteArray {
                offset: 0,
                fault: ByteArrayFault::BadHeader(_)
            }
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let words = [Felt::from(2u64), Felt::from_short_string("a").unwrap(), Felt::ZERO];
        let err = decode_all(&words).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedByteArray {
                offset: 0,
                fault: ByteArrayFault::Truncated {
                    needed: 5,
                    available: 3
                }
            }
        );

        assert!(matches!(
            decode_all(&[]).unwrap_err(),
            DecodeError::MalformedByteArray { .. }
        ));
    }

    #[test]
    fn test_pending_len_out_of_range() {
        let words = [Felt::ZERO, Felt::from_short_string("a").unwrap(), Felt::from(31u64)];
        let err = decode_all(&words).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedByteArray {
                offset: 2,
                fault: ByteArrayFault::PendingLenOutOfRange(_)
            }
        ));
    }
}
