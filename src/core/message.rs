use bytes::Bytes;
use std::fmt;

/// Opaque payload moved between the local endpoints and the remote list.
///
/// The store sees raw bytes only. Cloning is cheap (`Bytes` is refcounted).
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Message(Bytes);

impl Message {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Message(payload.into())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for Message {
    fn from(b: Bytes) -> Self {
        Message(b)
    }
}

impl From<Vec<u8>> for Message {
    fn from(v: Vec<u8>) -> Self {
        Message(Bytes::from(v))
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message(Bytes::from(s))
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<&[u8]> for Message {
    fn from(s: &[u8]) -> Self {
        Message(Bytes::copy_from_slice(s))
    }
}

/// Marshaling adapter between a caller-facing payload type and [`Message`].
///
/// Text and byte payloads are the same thing on the wire; endpoints are
/// generic over this trait so callers pick whichever is convenient.
pub trait Payload: Send + 'static {
    fn into_message(self) -> Message;
    fn from_message(message: Message) -> Self;
}

impl Payload for Message {
    #[inline]
    fn into_message(self) -> Message {
        self
    }

    #[inline]
    fn from_message(message: Message) -> Self {
        message
    }
}

impl Payload for Bytes {
    fn into_message(self) -> Message {
        Message(self)
    }

    fn from_message(message: Message) -> Self {
        message.0
    }
}

impl Payload for Vec<u8> {
    fn into_message(self) -> Message {
        Message::from(self)
    }

    fn from_message(message: Message) -> Self {
        message.0.to_vec()
    }
}

/// Invalid UTF-8 is replaced, not rejected.
impl Payload for String {
    fn into_message(self) -> Message {
        Message::from(self)
    }

    fn from_message(message: Message) -> Self {
        match String::from_utf8(message.0.to_vec()) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}
