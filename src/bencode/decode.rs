use super::error::BencodeError;
use super::value::Value;
use bytes::Bytes;
use std::collections::BTreeMap;

const MAX_DEPTH: usize = 64;

/// Decodes a complete bencode document.
///
/// Decoding is strict: integers with leading zeros or `-0`, dictionaries
/// whose keys are not in ascending bytewise order, and bytes after the
/// top-level value are all rejected. Anything this function accepts
/// re-encodes to the identical byte sequence.
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    let mut decoder = Decoder { data, pos: 0 };
    let value = decoder.value(0)?;

    if decoder.pos != data.len() {
        return Err(BencodeError::TrailingData);
    }

    Ok(value)
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEof)
    }

    /// Returns the bytes up to (not including) `delim` and moves past it.
    fn take_until(&mut self, delim: u8) -> Result<&'a [u8], BencodeError> {
        let data = self.data;
        let start = self.pos;
        let len = data[start..]
            .iter()
            .position(|&b| b == delim)
            .ok_or(BencodeError::UnexpectedEof)?;
        self.pos = start + len + 1;
        Ok(&data[start..start + len])
    }

    fn value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > MAX_DEPTH {
            return Err(BencodeError::NestingTooDeep);
        }

        match self.peek()? {
            b'i' => self.integer(),
            b'l' => self.list(depth),
            b'd' => self.dict(depth),
            b'0'..=b'9' => self.bytes().map(Value::Bytes),
            c => Err(BencodeError::UnexpectedChar {
                found: c as char,
                offset: self.pos,
            }),
        }
    }

    fn integer(&mut self) -> Result<Value, BencodeError> {
        self.pos += 1;
        let raw = self.take_until(b'e')?;
        let text = std::str::from_utf8(raw)
            .map_err(|_| BencodeError::InvalidInteger("invalid utf8".into()))?;

        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BencodeError::InvalidInteger(text.into()));
        }
        if text == "-0" || (digits.starts_with('0') && digits.len() > 1) {
            return Err(BencodeError::InvalidInteger("leading zeros".into()));
        }

        text.parse()
            .map(Value::Integer)
            .map_err(|_| BencodeError::InvalidInteger(text.into()))
    }

    fn bytes(&mut self) -> Result<Bytes, BencodeError> {
        let raw = self.take_until(b':')?;
        if !raw.iter().all(u8::is_ascii_digit) || (raw.len() > 1 && raw[0] == b'0') {
            return Err(BencodeError::InvalidStringLength);
        }
        let len: usize = std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(BencodeError::InvalidStringLength)?;

        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(BencodeError::UnexpectedEof)?;

        let bytes = Bytes::copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(bytes)
    }

    fn list(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut list = Vec::new();

        while self.peek()? != b'e' {
            list.push(self.value(depth + 1)?);
        }

        self.pos += 1;
        Ok(Value::List(list))
    }

    fn dict(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut dict = BTreeMap::new();
        let mut last_key: Option<Bytes> = None;

        while self.peek()? != b'e' {
            let c = self.peek()?;
            if !c.is_ascii_digit() {
                return Err(BencodeError::UnexpectedChar {
                    found: c as char,
                    offset: self.pos,
                });
            }
            let key = self.bytes()?;

            if last_key.as_ref().is_some_and(|prev| *prev >= key) {
                return Err(BencodeError::UnsortedKeys(
                    String::from_utf8_lossy(&key).into_owned(),
                ));
            }

            let value = self.value(depth + 1)?;
            last_key = Some(key.clone());
            dict.insert(key, value);
        }

        self.pos += 1;
        Ok(Value::Dict(dict))
    }
}
