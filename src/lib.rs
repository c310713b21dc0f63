//! # Retrocompress
//!
//! Compress or expand files in the classical `compress(1)` `.Z` format:
//! a variable-width LZW codec with a CLEAR-code dictionary reset and a
//! ratio heuristic deciding when to trigger it.
//!
//! * `lzw` implements the codec itself, including the 9-bit width-growth
//!   quirk and the group-padding rule that make the format interoperate
//!   with every other `.Z` implementation.
//!
//! ## Buffer Example
//!
//! ```rs
//! use retrocompress::lzw;
//! let test_data = "This is the chaunt of the priests.  The chaunt of the priests of Mung.".as_bytes();
//! let compressed = lzw::encode_slice(test_data,16).expect("compression failed");
//! let expanded = lzw::decode_slice(&compressed).expect("expansion failed");
//! assert_eq!(expanded,test_data);
//! ```

pub mod lzw;

/// Crate errors.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("read error")]
    Read(#[source] std::io::Error),
    #[error("write error")]
    Write(#[source] std::io::Error),
    #[error("format error: {0}")]
    Format(String)
}
