use std::fmt;

/// Keys, values and list elements all travel as a `Slice`: an owned byte string.
///
/// RESP bulk strings are binary safe, so nothing here assumes UTF-8. Owning the
/// bytes keeps the client and the mock store free of borrowed buffers that
/// would have to outlive a single read from the socket.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slice(pub Vec<u8>);

impl Slice {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Slice {
    fn from(bytes: Vec<u8>) -> Self {
        Slice(bytes)
    }
}

impl From<&[u8]> for Slice {
    fn from(bytes: &[u8]) -> Self {
        Slice(bytes.to_vec())
    }
}

impl From<&str> for Slice {
    fn from(s: &str) -> Self {
        Slice(s.as_bytes().to_vec())
    }
}

impl From<String> for Slice {
    fn from(s: String) -> Self {
        Slice(s.into_bytes())
    }
}

// Integers are sent in their decimal form, the same way redis clients do.
impl From<i64> for Slice {
    fn from(n: i64) -> Self {
        Slice(n.to_string().into_bytes())
    }
}

impl fmt::Debug for Slice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => write!(f, "{:?}", s),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}
