use bytes::Bytes;
use std::collections::BTreeMap;

/// A bencode value.
///
/// Dictionaries keep their keys in a `BTreeMap`, so iteration order is the
/// bytewise order that canonical bencode requires.
///
/// # Examples
///
/// ```
/// use rbit_create::bencode::Value;
///
/// let value = Value::dict([("length", Value::from(3u64)), ("path", Value::list(["a"]))]);
///
/// assert_eq!(value.get(b"length").and_then(Value::as_integer), Some(3));
/// assert_eq!(value.get(b"path").and_then(Value::as_list).map(Vec::len), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A signed 64-bit integer.
    Integer(i64),
    /// A byte string (may or may not be valid UTF-8).
    Bytes(Bytes),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A dictionary with byte string keys.
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    /// Creates a byte string value from a UTF-8 string.
    pub fn string(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Creates a list of byte strings.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Value::List(items.into_iter().map(|s| Value::string(s.as_ref())).collect())
    }

    /// Creates a dictionary from `(key, value)` pairs. Later duplicates win.
    pub fn dict<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<[u8]>,
    {
        Value::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (Bytes::copy_from_slice(k.as_ref()), v))
                .collect(),
        )
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as a UTF-8 string.
    ///
    /// Returns `None` if the value is not a byte string or is not valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a key if this value is a dictionary.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(key)
    }

    /// Inserts `key` into a dictionary value. No-op for other variants.
    pub fn insert(&mut self, key: &'static [u8], value: Value) {
        if let Value::Dict(d) = self {
            d.insert(Bytes::from_static(key), value);
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

// Lengths and offsets are u64 in the file model. Bencode integers are
// signed; values above i64::MAX saturate.
impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bytes(Bytes::from(s))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<BTreeMap<Bytes, Value>> for Value {
    fn from(d: BTreeMap<Bytes, Value>) -> Self {
        Value::Dict(d)
    }
}
