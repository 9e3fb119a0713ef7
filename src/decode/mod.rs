//! Payload decoding: packed strings, split integers, and event schemas

mod byte_array;
mod cursor;
mod decoder;
mod parser;
mod uint;

pub use byte_array::{
    decode_byte_array, decode_full_word, decode_pending_word, encode_byte_array,
    DecodedByteArray, FragmentError, FragmentFault, BYTES_PER_WORD, MAX_FULL_WORDS,
};
pub use cursor::FeltCursor;
pub use decoder::{
    DecodedEvent, DecodedFields, DecodedRecord, DecodedValue, EventDecoder, LogDecoder,
};
pub use parser::{selector_for, EventSignature, ParamKind, ParsedParam};
pub use uint::{decode_u256, read_u256, split_u256};
