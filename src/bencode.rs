//! Canonical bencode encoding and decoding ([BEP-3]).
//!
//! Torrent metainfo is serialized as bencode. The format is defined entirely
//! by length prefixes and delimiters, so a created torrent is only valid if
//! every byte count is exact and every dictionary is written with its keys in
//! sorted order.
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` |
//! | Byte String | `<length>:<data>` | `4:spam` |
//! | List | `l<items>e` | `l4:spami42ee` |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` |
//!
//! [`Value::Dict`] is backed by a `BTreeMap<Bytes, Value>`, which orders keys
//! bytewise, so encoding a value always produces the canonical form.
//!
//! # Examples
//!
//! ```
//! use rbit_create::bencode::{decode, encode, encoded_len, Value};
//!
//! let value = Value::dict([
//!     ("piece length", Value::from(16384u64)),
//!     ("name", Value::from("example")),
//! ]);
//!
//! let encoded = encode(&value).unwrap();
//! assert_eq!(encoded, b"d4:name7:example12:piece lengthi16384ee");
//! assert_eq!(encoded_len(&value), encoded.len());
//! assert_eq!(decode(&encoded).unwrap(), value);
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::decode;
pub use encode::{encode, encode_to, encoded_len};
pub use error::BencodeError;
pub use value::Value;
