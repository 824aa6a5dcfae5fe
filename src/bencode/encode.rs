use super::error::BencodeError;
use super::value::Value;
use std::io::Write;

/// Encodes a bencode value into a freshly allocated buffer.
///
/// The buffer is pre-sized with [`encoded_len`], so encoding a torrent with
/// tens of thousands of piece hashes performs a single allocation.
///
/// # Examples
///
/// ```
/// use rbit_create::bencode::{encode, Value};
///
/// let list = Value::List(vec![Value::Integer(1), Value::string("two")]);
/// assert_eq!(encode(&list).unwrap(), b"li1e3:twoe");
/// ```
pub fn encode(value: &Value) -> Result<Vec<u8>, BencodeError> {
    let mut buf = Vec::with_capacity(encoded_len(value));
    encode_to(value, &mut buf)?;
    Ok(buf)
}

/// Writes the canonical encoding of `value` to `writer`.
pub fn encode_to<W: Write>(value: &Value, writer: &mut W) -> Result<(), BencodeError> {
    match value {
        Value::Integer(i) => {
            write!(writer, "i{}e", i)?;
        }
        Value::Bytes(b) => write_bytes(b, writer)?,
        Value::List(l) => {
            writer.write_all(b"l")?;
            for item in l {
                encode_to(item, writer)?;
            }
            writer.write_all(b"e")?;
        }
        Value::Dict(d) => {
            writer.write_all(b"d")?;
            for (key, val) in d {
                write_bytes(key, writer)?;
                encode_to(val, writer)?;
            }
            writer.write_all(b"e")?;
        }
    }
    Ok(())
}

fn write_bytes<W: Write>(bytes: &[u8], writer: &mut W) -> Result<(), BencodeError> {
    write!(writer, "{}:", bytes.len())?;
    writer.write_all(bytes)?;
    Ok(())
}

/// Returns the exact number of bytes [`encode`] produces for `value`.
pub fn encoded_len(value: &Value) -> usize {
    match value {
        Value::Integer(i) => 2 + integer_digits(*i),
        Value::Bytes(b) => string_len(b.len()),
        Value::List(l) => 2 + l.iter().map(encoded_len).sum::<usize>(),
        Value::Dict(d) => {
            2 + d
                .iter()
                .map(|(k, v)| string_len(k.len()) + encoded_len(v))
                .sum::<usize>()
        }
    }
}

fn string_len(len: usize) -> usize {
    decimal_digits(len as u64) + 1 + len
}

fn integer_digits(i: i64) -> usize {
    let sign = usize::from(i < 0);
    sign + decimal_digits(i.unsigned_abs())
}

fn decimal_digits(mut n: u64) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
