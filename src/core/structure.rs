//! Purpose: Fixed-length, fixed-alignment views that structure definitions are laid out on.
//! Exports: `Layout`, `Structure`, `StructureView`.
//! Role: Import a structure returned by a call; export a structure passed as an argument.
//! Invariants: Length and alignment never change after construction.
//! Invariants: A view keeps a private copy of its bytes; it records only the bound offset.
//! Invariants: Import/export/store fail with `UnboundView` until `bind` succeeds.
use tracing::{debug, trace};

use crate::core::buffer::{ByteBuffer, ByteOrder, WireBuf};
use crate::core::error::{Error, ErrorKind};

pub const MAX_ALIGNMENT: usize = 16;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Layout {
    length: usize,
    alignment: usize,
}

impl Layout {
    /// Compile-time layout for a structure definition; an invalid alignment fails const evaluation.
    pub const fn fixed(length: usize, alignment: usize) -> Self {
        assert!(alignment.is_power_of_two() && alignment <= MAX_ALIGNMENT);
        Self { length, alignment }
    }

    pub fn new(length: usize, alignment: usize) -> Result<Self, Error> {
        if !alignment.is_power_of_two() || alignment > MAX_ALIGNMENT {
            return Err(Error::new(ErrorKind::OutOfRange)
                .with_message(format!("alignment {alignment} is not a power of two in 1..={MAX_ALIGNMENT}")));
        }
        Ok(Self { length, alignment })
    }

    pub const fn length(&self) -> usize {
        self.length
    }

    pub const fn alignment(&self) -> usize {
        self.alignment
    }
}

/// An externally defined record laid out on a [`StructureView`].
pub trait Structure: Sized {
    const LAYOUT: Layout;

    fn read_from(view: &StructureView) -> Result<Self, Error>;

    fn write_to(&self, view: &mut StructureView) -> Result<(), Error>;
}

macro_rules! view_field {
    ($read:ident, $write:ident, $ty:ty, $width:literal) => {
        pub fn $read(&self, offset: usize) -> Result<$ty, Error> {
            let mut raw = [0u8; $width];
            raw.copy_from_slice(self.field(offset, $width)?);
            Ok(match self.order {
                ByteOrder::Little => <$ty>::from_le_bytes(raw),
                ByteOrder::Big => <$ty>::from_be_bytes(raw),
            })
        }

        pub fn $write(&mut self, offset: usize, value: $ty) -> Result<(), Error> {
            let raw = match self.order {
                ByteOrder::Little => value.to_le_bytes(),
                ByteOrder::Big => value.to_be_bytes(),
            };
            self.field_mut(offset, $width)?.copy_from_slice(&raw);
            Ok(())
        }
    };
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StructureView {
    layout: Layout,
    storage: Vec<u8>,
    bound: Option<usize>,
    order: ByteOrder,
}

impl StructureView {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            storage: vec![0; layout.length],
            bound: None,
            order: ByteOrder::default(),
        }
    }

    pub fn of<S: Structure>() -> Self {
        Self::new(S::LAYOUT)
    }

    pub fn length(&self) -> usize {
        self.layout.length
    }

    pub fn alignment(&self) -> usize {
        self.layout.alignment
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn bound_offset(&self) -> Option<usize> {
        self.bound
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.storage
    }

    /// Attaches the view at `base` and snapshots the bytes found there.
    pub fn bind(&mut self, buffer: &ByteBuffer, base: usize) -> Result<(), Error> {
        if base % self.layout.alignment != 0 {
            return Err(Error::new(ErrorKind::OutOfRange)
                .with_message(format!(
                    "offset is not aligned to {} bytes",
                    self.layout.alignment
                ))
                .with_offset(base as u64));
        }
        self.copy_in(buffer, base)?;
        self.bound = Some(base);
        self.order = buffer.byte_order();
        debug!(base, length = self.layout.length, "structure view bound");
        Ok(())
    }

    pub fn unbind(&mut self) {
        self.bound = None;
    }

    /// Replaces the private bytes with the buffer's bytes at the bound offset.
    pub fn import_from(&mut self, buffer: &ByteBuffer) -> Result<(), Error> {
        let base = self.require_bound("import")?;
        self.copy_in(buffer, base)?;
        trace!(base, "structure view imported");
        Ok(())
    }

    /// Appends the private bytes at the destination's cursor.
    pub fn export_to<B: WireBuf>(&self, destination: &mut B) -> Result<(), Error> {
        self.require_bound("export")?;
        destination.put_bytes(&self.storage)?;
        trace!(length = self.storage.len(), "structure view exported");
        Ok(())
    }

    /// Writes the private bytes back over the bound region without moving the buffer's cursor.
    pub fn store_into(&self, buffer: &mut ByteBuffer) -> Result<(), Error> {
        let base = self.require_bound("store")?;
        let mut region = buffer.sub_view(base, self.layout.length)?;
        region.put_bytes(&self.storage)
    }

    pub fn decode<S: Structure>(&self) -> Result<S, Error> {
        self.check_layout::<S>()?;
        S::read_from(self)
    }

    pub fn encode<S: Structure>(&mut self, value: &S) -> Result<(), Error> {
        self.check_layout::<S>()?;
        value.write_to(self)
    }

    view_field!(read_u16, write_u16, u16, 2);
    view_field!(read_u32, write_u32, u32, 4);
    view_field!(read_u64, write_u64, u64, 8);
    view_field!(read_i16, write_i16, i16, 2);
    view_field!(read_i32, write_i32, i32, 4);
    view_field!(read_i64, write_i64, i64, 8);

    pub fn read_u8(&self, offset: usize) -> Result<u8, Error> {
        Ok(self.field(offset, 1)?[0])
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> Result<(), Error> {
        self.field_mut(offset, 1)?[0] = value;
        Ok(())
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8, Error> {
        Ok(self.read_u8(offset)? as i8)
    }

    pub fn write_i8(&mut self, offset: usize, value: i8) -> Result<(), Error> {
        self.write_u8(offset, value as u8)
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&[u8], Error> {
        self.field(offset, len)
    }

    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Error> {
        self.field_mut(offset, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    fn field(&self, offset: usize, width: usize) -> Result<&[u8], Error> {
        offset
            .checked_add(width)
            .and_then(|end| self.storage.get(offset..end))
            .ok_or_else(|| self.field_out_of_bounds(offset, width))
    }

    fn field_mut(&mut self, offset: usize, width: usize) -> Result<&mut [u8], Error> {
        let err = self.field_out_of_bounds(offset, width);
        offset
            .checked_add(width)
            .and_then(|end| self.storage.get_mut(offset..end))
            .ok_or(err)
    }

    fn field_out_of_bounds(&self, offset: usize, width: usize) -> Error {
        Error::new(ErrorKind::OutOfBounds)
            .with_message(format!(
                "{width}-byte field does not fit in {}-byte structure",
                self.layout.length
            ))
            .with_offset(offset as u64)
    }

    fn copy_in(&mut self, buffer: &ByteBuffer, base: usize) -> Result<(), Error> {
        let bytes = base
            .checked_add(self.layout.length)
            .and_then(|end| buffer.as_slice().get(base..end))
            .ok_or_else(|| {
                Error::new(ErrorKind::OutOfBounds)
                    .with_message(format!(
                        "{}-byte structure does not fit in {}-byte buffer",
                        self.layout.length,
                        buffer.len()
                    ))
                    .with_offset(base as u64)
            })?;
        self.storage.copy_from_slice(bytes);
        Ok(())
    }

    fn require_bound(&self, operation: &str) -> Result<usize, Error> {
        self.bound.ok_or_else(|| {
            Error::new(ErrorKind::UnboundView)
                .with_message(format!("cannot {operation} a structure view before bind"))
        })
    }

    fn check_layout<S: Structure>(&self) -> Result<(), Error> {
        if S::LAYOUT != self.layout {
            return Err(Error::new(ErrorKind::InvalidType).with_message(format!(
                "structure layout {:?} does not match view layout {:?}",
                S::LAYOUT,
                self.layout
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Layout, Structure, StructureView};
    use crate::core::buffer::{ByteBuffer, ByteOrder, WireBuf};
    use crate::core::error::{Error, ErrorKind};

    #[derive(Debug, PartialEq)]
    struct CallHeader {
        opcode: u16,
        flags: u16,
        call_id: u32,
    }

    impl Structure for CallHeader {
        const LAYOUT: Layout = Layout::fixed(8, 4);

        fn read_from(view: &StructureView) -> Result<Self, Error> {
            Ok(Self {
                opcode: view.read_u16(0)?,
                flags: view.read_u16(2)?,
                call_id: view.read_u32(4)?,
            })
        }

        fn write_to(&self, view: &mut StructureView) -> Result<(), Error> {
            view.write_u16(0, self.opcode)?;
            view.write_u16(2, self.flags)?;
            view.write_u32(4, self.call_id)
        }
    }

    fn header_buffer() -> ByteBuffer {
        let mut buf = ByteBuffer::new();
        buf.put_u32(0xdead_beef).expect("pad");
        buf.put_u16(7).expect("opcode");
        buf.put_u16(1).expect("flags");
        buf.put_u32(42).expect("call id");
        buf
    }

    #[test]
    fn accessors_work_unbound() {
        let view = StructureView::of::<CallHeader>();
        assert_eq!(view.length(), 8);
        assert_eq!(view.alignment(), 4);
        assert!(!view.is_bound());
    }

    #[test]
    fn layout_rejects_bad_alignment() {
        for alignment in [0, 3, 6, 32] {
            assert_eq!(
                Layout::new(8, alignment).unwrap_err().kind(),
                ErrorKind::OutOfRange
            );
        }
        for alignment in [1, 2, 4, 8, 16] {
            assert_eq!(Layout::new(8, alignment).unwrap().alignment(), alignment);
        }
    }

    #[test]
    fn import_and_export_require_bind() {
        let buf = header_buffer();
        let mut view = StructureView::of::<CallHeader>();
        assert_eq!(view.import_from(&buf).unwrap_err().kind(), ErrorKind::UnboundView);
        let mut dest = ByteBuffer::new();
        assert_eq!(view.export_to(&mut dest).unwrap_err().kind(), ErrorKind::UnboundView);
        assert!(dest.is_empty());
    }

    #[test]
    fn bind_checks_bounds_and_alignment() {
        let buf = header_buffer();
        let mut view = StructureView::of::<CallHeader>();
        assert_eq!(view.bind(&buf, 2).unwrap_err().kind(), ErrorKind::OutOfRange);
        assert_eq!(view.bind(&buf, 8).unwrap_err().kind(), ErrorKind::OutOfBounds);
        assert!(!view.is_bound());
        view.bind(&buf, 4).expect("bind");
        assert_eq!(view.bound_offset(), Some(4));
    }

    #[test]
    fn decode_reads_bound_bytes() {
        let buf = header_buffer();
        let mut view = StructureView::of::<CallHeader>();
        view.bind(&buf, 4).expect("bind");
        let header: CallHeader = view.decode().expect("decode");
        assert_eq!(
            header,
            CallHeader {
                opcode: 7,
                flags: 1,
                call_id: 42
            }
        );
    }

    #[test]
    fn import_refreshes_private_copy() {
        let mut buf = header_buffer();
        let mut view = StructureView::of::<CallHeader>();
        view.bind(&buf, 4).expect("bind");

        buf.seek(8).expect("seek");
        buf.put_u32(99).expect("rewrite call id");
        assert_eq!(view.read_u32(4).unwrap(), 42);
        view.import_from(&buf).expect("import");
        assert_eq!(view.read_u32(4).unwrap(), 99);
    }

    #[test]
    fn export_appends_and_store_writes_back() {
        let mut buf = header_buffer();
        let mut view = StructureView::of::<CallHeader>();
        view.bind(&buf, 4).expect("bind");
        view.encode(&CallHeader {
            opcode: 9,
            flags: 0,
            call_id: 5,
        })
        .expect("encode");

        let mut dest = ByteBuffer::new();
        dest.put_u8(0xaa).expect("prefix");
        view.export_to(&mut dest).expect("export");
        assert_eq!(dest.len(), 9);
        dest.seek(1).expect("seek");
        assert_eq!(dest.get_u16().unwrap(), 9);

        let position = buf.position();
        view.store_into(&mut buf).expect("store");
        assert_eq!(buf.position(), position);
        buf.seek(4).expect("seek");
        assert_eq!(buf.get_u16().unwrap(), 9);
    }

    #[test]
    fn fields_are_bounded_by_length() {
        let mut view = StructureView::new(Layout::new(4, 1).unwrap());
        assert_eq!(view.read_u64(0).unwrap_err().kind(), ErrorKind::OutOfBounds);
        assert_eq!(view.write_u16(3, 1).unwrap_err().kind(), ErrorKind::OutOfBounds);
        assert_eq!(view.read_u8(usize::MAX).unwrap_err().kind(), ErrorKind::OutOfBounds);
        view.write_i8(3, -1).expect("last byte");
        assert_eq!(view.as_bytes(), &[0, 0, 0, 0xff]);
    }

    #[test]
    fn view_follows_buffer_byte_order() {
        let mut buf = ByteBuffer::with_order(ByteOrder::Big);
        buf.put_u32(0x0102_0304).expect("put");
        let mut view = StructureView::new(Layout::new(4, 4).unwrap());
        view.bind(&buf, 0).expect("bind");
        assert_eq!(view.read_u32(0).unwrap(), 0x0102_0304);
        assert_eq!(view.read_bytes(0, 2).unwrap(), &[1, 2]);
    }

    #[test]
    fn mismatched_structure_is_rejected() {
        let view = StructureView::new(Layout::new(4, 4).unwrap());
        assert_eq!(view.decode::<CallHeader>().unwrap_err().kind(), ErrorKind::InvalidType);
    }
}
