// End-to-end marshalling flows through the public api surface.
use num_bigint::BigInt;
use wirebox::api::{
    ByteBuffer, ByteOrder, Decimal, DynHolder, ErrorKind, Holder, HolderKind, Layout, Structure,
    StructureView, TextAdapter, TextCodec, Value, WireBuf, Xid,
};

#[test]
fn u32_holder_survives_view_export() {
    let holder = Holder::<u32>::new(4_294_967_295);
    let mut source = ByteBuffer::new();
    source.put_u32(*holder.get()).expect("put");

    let mut view = StructureView::new(Layout::new(4, 4).expect("layout"));
    view.bind(&source, 0).expect("bind");

    let mut destination = ByteBuffer::new();
    view.export_to(&mut destination).expect("export");
    destination.seek(0).expect("rewind");
    assert_eq!(destination.get_u32().expect("get"), 4_294_967_295);
}

#[test]
fn text_round_trip_is_identity() {
    let adapter = TextAdapter::<u16>::with_value(65535);
    let text = adapter.get_as_text();
    assert_eq!(text, "65535");

    let mut decoded = TextAdapter::<u16>::new();
    decoded.set_as_text(&text).expect("decode");
    assert_eq!(*decoded.holder().get(), 65535);

    for (kind, literal) in [
        (HolderKind::I64, "-9223372036854775808"),
        (HolderKind::Bool, "true"),
        (HolderKind::String, "héllo"),
        (HolderKind::Decimal, "-0.050"),
        (HolderKind::BigInt, "340282366920938463463374607431768211456"),
        (HolderKind::Timestamp, "1999-12-31T23:59:59.000000001Z"),
        (HolderKind::Array, "null"),
    ] {
        let mut holder = DynHolder::new(kind);
        holder.set_as_text(literal).expect(literal);
        let mut again = DynHolder::new(kind);
        again.set_as_text(&holder.get_as_text()).expect("re-decode");
        assert_eq!(again.get(), holder.get(), "{kind}");
    }
}

#[test]
fn range_violations_are_rejected() {
    let mut signed = TextAdapter::<i8>::new();
    assert_eq!(
        signed.set_as_text("999999").unwrap_err().kind(),
        ErrorKind::OutOfRange
    );
    let mut unsigned = TextAdapter::<u32>::new();
    assert_eq!(
        unsigned.set_as_text("-1").unwrap_err().kind(),
        ErrorKind::OutOfRange
    );
    assert_eq!(*unsigned.holder().get(), 0);
}

#[test]
fn decimal_text_is_exact() {
    let big = Decimal::new(BigInt::from(9_007_199_254_740_994_000u64), 6).expect("decimal");
    assert_eq!(big.to_text(), "9007199254740.994000");
    assert_eq!(
        Decimal::new(BigInt::from(123), 7).expect("decimal").to_text(),
        "0.0000123"
    );
    assert_eq!(Decimal::new(BigInt::from(0), 2).expect("decimal").to_text(), "0.00");

    let err = Decimal::new(BigInt::from(9_007_199_254_740_994_000u64), -6).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidScale);
}

#[test]
fn sub_view_writes_stop_at_its_end() {
    for n in 0..16usize {
        let mut parent = ByteBuffer::from_vec(vec![0; n + 4], ByteOrder::Little).expect("buffer");
        let mut view = parent.sub_view(2, n).expect("view");
        assert_eq!(
            view.put_bytes(&vec![0xAA; n + 1]).unwrap_err().kind(),
            ErrorKind::OutOfBounds
        );
        view.put_bytes(&vec![0xAA; n]).expect("fits");
        assert_eq!(view.get_u8().unwrap_err().kind(), ErrorKind::OutOfBounds);
        assert_eq!(parent.as_slice()[..2], [0, 0]);
        assert!(parent.as_slice()[2..2 + n].iter().all(|b| *b == 0xAA));
        assert_eq!(parent.as_slice()[2 + n..], [0, 0]);
    }
}

#[derive(Debug, PartialEq)]
struct Reply {
    status: u32,
    sequence: u64,
}

impl Structure for Reply {
    const LAYOUT: Layout = Layout::fixed(16, 8);

    fn read_from(view: &StructureView) -> Result<Self, wirebox::api::Error> {
        Ok(Self {
            status: view.read_u32(0)?,
            sequence: view.read_u64(8)?,
        })
    }

    fn write_to(&self, view: &mut StructureView) -> Result<(), wirebox::api::Error> {
        view.write_u32(0, self.status)?;
        view.write_u64(8, self.sequence)
    }
}

#[test]
fn reply_record_is_marshalled_with_its_call_id() {
    let id = Xid::from_call_number(42);
    let mut wire = ByteBuffer::with_order(ByteOrder::Big);
    id.encode_into(&mut wire).expect("xid");
    let padding = (8 - wire.len() % 8) % 8;
    wire.put_bytes(&vec![0; padding]).expect("pad");
    let record_at = wire.len();
    wire.put_bytes(&[0; 16]).expect("reserve");

    let mut view = StructureView::of::<Reply>();
    view.bind(&wire, record_at).expect("bind");
    view.encode(&Reply {
        status: 7,
        sequence: u64::MAX - 1,
    })
    .expect("encode");
    view.store_into(&mut wire).expect("store");

    wire.seek(0).expect("rewind");
    assert_eq!(Xid::decode_from(&mut wire).expect("decode xid"), id);
    let mut reread = StructureView::of::<Reply>();
    reread.bind(&wire, record_at).expect("rebind");
    assert_eq!(
        reread.decode::<Reply>().expect("decode"),
        Reply {
            status: 7,
            sequence: u64::MAX - 1,
        }
    );
}

#[test]
fn dyn_holder_keeps_its_kind() {
    let mut holder = DynHolder::new(HolderKind::U8);
    assert_eq!(
        holder.set(Value::Bool(true)).unwrap_err().kind(),
        ErrorKind::InvalidType
    );
    assert_eq!(
        holder.set(Value::I32(300)).unwrap_err().kind(),
        ErrorKind::OutOfRange
    );
    holder.set(Value::I32(200)).expect("in range");
    assert_eq!(holder.get(), &Value::U8(200));
    assert_eq!(holder.kind(), HolderKind::U8);
}
