//! Purpose: Positional byte buffer with typed put/get primitives and bounded sub-views.
//! Exports: `ByteBuffer`, `SubView`, `WireBuf`, `ByteOrder`, `MAX_BUFFER_LEN`.
//! Role: Lowest layer a transport uses to lay out call arguments and replies.
//! Invariants: The cursor always sits in `[0, len]`; a failed put/get leaves it unchanged.
//! Invariants: A sub-view never touches bytes outside `[base, base + len)` of its parent.
//! Notes: Strings are a u32 length prefix (buffer byte order) followed by UTF-8 bytes;
//! C strings are UTF-8 bytes followed by a single NUL.

use crate::core::error::{Error, ErrorKind};

/// Hard cap on root buffer growth.
pub const MAX_BUFFER_LEN: usize = 256 * 1024 * 1024;

const STRING_PREFIX_LEN: usize = 4;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

fn out_of_bounds(position: usize, wanted: usize, len: usize) -> Error {
    Error::new(ErrorKind::OutOfBounds)
        .with_message(format!("{wanted} byte(s) requested with {} available", len.saturating_sub(position)))
        .with_offset(position as u64)
}

macro_rules! wire_int {
    ($put:ident, $get:ident, $ty:ty, $width:literal) => {
        fn $put(&mut self, value: $ty) -> Result<(), Error> {
            match self.byte_order() {
                ByteOrder::Little => self.put_bytes(&value.to_le_bytes()),
                ByteOrder::Big => self.put_bytes(&value.to_be_bytes()),
            }
        }

        fn $get(&mut self) -> Result<$ty, Error> {
            let bytes = self.get_array::<$width>()?;
            Ok(match self.byte_order() {
                ByteOrder::Little => <$ty>::from_le_bytes(bytes),
                ByteOrder::Big => <$ty>::from_be_bytes(bytes),
            })
        }
    };
}

/// Cursor-based typed access shared by [`ByteBuffer`] and [`SubView`].
///
/// Implementors supply the window and the raw write; every typed primitive
/// is derived from those and advances the cursor by its exact encoded width.
pub trait WireBuf {
    fn byte_order(&self) -> ByteOrder;

    fn position(&self) -> usize;

    /// Logical end of the readable region.
    fn len(&self) -> usize;

    /// Moves the cursor. There is no implicit rewind anywhere else.
    fn seek(&mut self, position: usize) -> Result<(), Error>;

    /// Bytes between the cursor and the logical end.
    fn unread(&self) -> &[u8];

    /// Writes `bytes` at the cursor and advances past them.
    fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remaining(&self) -> usize {
        self.len() - self.position()
    }

    /// Runs a multi-field decode, restoring the cursor to where it started if any field fails.
    fn read_record<T>(
        &mut self,
        decode: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error>
    where
        Self: Sized,
    {
        let start = self.position();
        let result = decode(self);
        if result.is_err() {
            // `start` was a valid position and the window has not shrunk.
            let _ = self.seek(start);
        }
        result
    }

    fn get_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let start = self.position();
        let mut out = [0u8; N];
        let src = self
            .unread()
            .get(..N)
            .ok_or_else(|| out_of_bounds(start, N, self.len()))?;
        out.copy_from_slice(src);
        self.seek(start + N)?;
        Ok(out)
    }

    fn get_bytes(&mut self, count: usize) -> Result<Vec<u8>, Error> {
        let start = self.position();
        let out = self
            .unread()
            .get(..count)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| out_of_bounds(start, count, self.len()))?;
        self.seek(start + count)?;
        Ok(out)
    }

    fn put_u8(&mut self, value: u8) -> Result<(), Error> {
        self.put_bytes(&[value])
    }

    fn get_u8(&mut self) -> Result<u8, Error> {
        let [byte] = self.get_array::<1>()?;
        Ok(byte)
    }

    fn put_i8(&mut self, value: i8) -> Result<(), Error> {
        self.put_bytes(&value.to_le_bytes())
    }

    fn get_i8(&mut self) -> Result<i8, Error> {
        Ok(i8::from_le_bytes(self.get_array::<1>()?))
    }

    wire_int!(put_u16, get_u16, u16, 2);
    wire_int!(put_u32, get_u32, u32, 4);
    wire_int!(put_u64, get_u64, u64, 8);
    wire_int!(put_i16, get_i16, i16, 2);
    wire_int!(put_i32, get_i32, i32, 4);
    wire_int!(put_i64, get_i64, i64, 8);

    fn put_bool(&mut self, value: bool) -> Result<(), Error> {
        self.put_u8(u8::from(value))
    }

    fn get_bool(&mut self) -> Result<bool, Error> {
        let start = self.position();
        match self.unread().first().copied() {
            Some(0) => {
                self.seek(start + 1)?;
                Ok(false)
            }
            Some(1) => {
                self.seek(start + 1)?;
                Ok(true)
            }
            Some(other) => Err(Error::new(ErrorKind::MalformedEncoding)
                .with_message(format!("boolean byte must be 0 or 1, found {other}"))
                .with_offset(start as u64)),
            None => Err(out_of_bounds(start, 1, self.len())),
        }
    }

    /// Writes a u32 length prefix and the UTF-8 bytes of `value` as one unit.
    fn put_string(&mut self, value: &str) -> Result<(), Error> {
        let len = u32::try_from(value.len()).map_err(|_| {
            Error::new(ErrorKind::OutOfRange)
                .with_message(format!("string of {} bytes exceeds u32 length prefix", value.len()))
        })?;
        let mut encoded = Vec::with_capacity(STRING_PREFIX_LEN + value.len());
        match self.byte_order() {
            ByteOrder::Little => encoded.extend_from_slice(&len.to_le_bytes()),
            ByteOrder::Big => encoded.extend_from_slice(&len.to_be_bytes()),
        }
        encoded.extend_from_slice(value.as_bytes());
        self.put_bytes(&encoded)
    }

    fn get_string(&mut self) -> Result<String, Error> {
        let start = self.position();
        let unread = self.unread();
        let Some(prefix) = unread.get(..STRING_PREFIX_LEN) else {
            return Err(Error::new(ErrorKind::MalformedEncoding)
                .with_message("missing string length prefix")
                .with_offset(start as u64));
        };
        let mut raw = [0u8; STRING_PREFIX_LEN];
        raw.copy_from_slice(prefix);
        let len = match self.byte_order() {
            ByteOrder::Little => u32::from_le_bytes(raw),
            ByteOrder::Big => u32::from_be_bytes(raw),
        } as usize;
        let payload = unread
            .get(STRING_PREFIX_LEN..STRING_PREFIX_LEN + len)
            .ok_or_else(|| out_of_bounds(start + STRING_PREFIX_LEN, len, self.len()))?;
        let text = std::str::from_utf8(payload)
            .map_err(|err| {
                Error::new(ErrorKind::MalformedEncoding)
                    .with_message("string payload is not valid UTF-8")
                    .with_offset(start as u64)
                    .with_source(err)
            })?
            .to_string();
        self.seek(start + STRING_PREFIX_LEN + len)?;
        Ok(text)
    }

    fn put_cstring(&mut self, value: &str) -> Result<(), Error> {
        if value.as_bytes().contains(&0) {
            return Err(Error::new(ErrorKind::MalformedEncoding)
                .with_message("C string contains an interior NUL"));
        }
        let mut encoded = Vec::with_capacity(value.len() + 1);
        encoded.extend_from_slice(value.as_bytes());
        encoded.push(0);
        self.put_bytes(&encoded)
    }

    fn get_cstring(&mut self) -> Result<String, Error> {
        let start = self.position();
        let unread = self.unread();
        let Some(nul) = unread.iter().position(|byte| *byte == 0) else {
            return Err(Error::new(ErrorKind::MalformedEncoding)
                .with_message("C string is missing its NUL terminator")
                .with_offset(start as u64));
        };
        let text = std::str::from_utf8(&unread[..nul])
            .map_err(|err| {
                Error::new(ErrorKind::MalformedEncoding)
                    .with_message("C string is not valid UTF-8")
                    .with_offset(start as u64)
                    .with_source(err)
            })?
            .to_string();
        self.seek(start + nul + 1)?;
        Ok(text)
    }
}

/// Growable root buffer owning its storage.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    position: usize,
    limit: usize,
    order: ByteOrder,
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::with_order(ByteOrder::default())
    }

    pub fn with_order(order: ByteOrder) -> Self {
        Self {
            bytes: Vec::new(),
            position: 0,
            limit: MAX_BUFFER_LEN,
            order,
        }
    }

    /// Buffer that refuses to grow beyond `limit` bytes.
    pub fn with_limit(limit: usize, order: ByteOrder) -> Self {
        Self {
            limit: limit.min(MAX_BUFFER_LEN),
            ..Self::with_order(order)
        }
    }

    pub fn from_vec(bytes: Vec<u8>, order: ByteOrder) -> Result<Self, Error> {
        if bytes.len() > MAX_BUFFER_LEN {
            return Err(out_of_bounds(0, bytes.len(), MAX_BUFFER_LEN));
        }
        Ok(Self {
            bytes,
            position: 0,
            limit: MAX_BUFFER_LEN,
            order,
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.position = 0;
    }

    /// Zero-copy window over `[base, base + len)` sharing this buffer's storage.
    pub fn sub_view(&mut self, base: usize, len: usize) -> Result<SubView<'_>, Error> {
        let end = base
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| out_of_bounds(base, len, self.bytes.len()))?;
        Ok(SubView {
            bytes: &mut self.bytes[base..end],
            position: 0,
            base,
            order: self.order,
        })
    }
}

impl WireBuf for ByteBuffer {
    fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn position(&self) -> usize {
        self.position
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn seek(&mut self, position: usize) -> Result<(), Error> {
        if position > self.bytes.len() {
            return Err(Error::new(ErrorKind::OutOfBounds)
                .with_message(format!("seek past end ({} bytes)", self.bytes.len()))
                .with_offset(position as u64));
        }
        self.position = position;
        Ok(())
    }

    fn unread(&self) -> &[u8] {
        &self.bytes[self.position..]
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let end = self
            .position
            .checked_add(bytes.len())
            .filter(|end| *end <= self.limit)
            .ok_or_else(|| out_of_bounds(self.position, bytes.len(), self.limit))?;
        if end > self.bytes.len() {
            self.bytes.resize(end, 0);
        }
        self.bytes[self.position..end].copy_from_slice(bytes);
        self.position = end;
        Ok(())
    }
}

/// Bounded window into a parent [`ByteBuffer`]; writes land in the parent.
#[derive(Debug)]
pub struct SubView<'a> {
    bytes: &'a mut [u8],
    position: usize,
    base: usize,
    order: ByteOrder,
}

impl SubView<'_> {
    /// Offset of this window inside the root buffer.
    pub fn base(&self) -> usize {
        self.base
    }

    pub fn as_slice(&self) -> &[u8] {
        self.bytes
    }

    pub fn sub_view(&mut self, base: usize, len: usize) -> Result<SubView<'_>, Error> {
        let end = base
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| out_of_bounds(base, len, self.bytes.len()))?;
        Ok(SubView {
            bytes: &mut self.bytes[base..end],
            position: 0,
            base: self.base + base,
            order: self.order,
        })
    }
}

impl WireBuf for SubView<'_> {
    fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn position(&self) -> usize {
        self.position
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn seek(&mut self, position: usize) -> Result<(), Error> {
        if position > self.bytes.len() {
            return Err(Error::new(ErrorKind::OutOfBounds)
                .with_message(format!("seek past end of {}-byte view", self.bytes.len()))
                .with_offset(position as u64));
        }
        self.position = position;
        Ok(())
    }

    fn unread(&self) -> &[u8] {
        &self.bytes[self.position..]
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let end = self
            .position
            .checked_add(bytes.len())
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| out_of_bounds(self.position, bytes.len(), self.bytes.len()))?;
        self.bytes[self.position..end].copy_from_slice(bytes);
        self.position = end;
        Ok(())
    }
}
