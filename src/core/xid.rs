//! Purpose: Correlation identifier for one in-flight remote call.
//! Exports: `Xid`, `MAX_XID_PART_LEN`.
//! Role: Key for `CallIdRegistry` and `CallContextMap`; opaque to this layer beyond identity.
//! Invariants: Global id and branch qualifier are at most `MAX_XID_PART_LEN` bytes each.
//! Invariants: Text form is `format:gtrid-hex:bqual-hex`; wire form is `i32 u8 bytes u8 bytes`.
use std::fmt;
use std::str::FromStr;

use crate::core::buffer::WireBuf;
use crate::core::error::{Error, ErrorKind};

pub const MAX_XID_PART_LEN: usize = 64;

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Xid {
    format_id: i32,
    global_id: Vec<u8>,
    branch_qualifier: Vec<u8>,
}

fn check_part(name: &str, part: &[u8]) -> Result<(), Error> {
    if part.len() > MAX_XID_PART_LEN {
        return Err(Error::new(ErrorKind::OutOfRange).with_message(format!(
            "{name} is {} bytes, limit is {MAX_XID_PART_LEN}",
            part.len()
        )));
    }
    Ok(())
}

impl Xid {
    pub fn new(
        format_id: i32,
        global_id: impl Into<Vec<u8>>,
        branch_qualifier: impl Into<Vec<u8>>,
    ) -> Result<Self, Error> {
        let global_id = global_id.into();
        let branch_qualifier = branch_qualifier.into();
        check_part("global id", &global_id)?;
        check_part("branch qualifier", &branch_qualifier)?;
        Ok(Self {
            format_id,
            global_id,
            branch_qualifier,
        })
    }

    /// Xid for a transport that numbers its calls sequentially.
    pub fn from_call_number(call: u64) -> Self {
        Self {
            format_id: 0,
            global_id: call.to_be_bytes().to_vec(),
            branch_qualifier: Vec::new(),
        }
    }

    pub fn format_id(&self) -> i32 {
        self.format_id
    }

    pub fn global_id(&self) -> &[u8] {
        &self.global_id
    }

    pub fn branch_qualifier(&self) -> &[u8] {
        &self.branch_qualifier
    }

    pub fn encode_into<B: WireBuf>(&self, buf: &mut B) -> Result<(), Error> {
        buf.put_i32(self.format_id)?;
        buf.put_u8(self.global_id.len() as u8)?;
        buf.put_bytes(&self.global_id)?;
        buf.put_u8(self.branch_qualifier.len() as u8)?;
        buf.put_bytes(&self.branch_qualifier)
    }

    /// Decodes one xid; on failure the cursor is left where the xid started.
    pub fn decode_from<B: WireBuf>(buf: &mut B) -> Result<Self, Error> {
        buf.read_record(|buf| {
            let format_id = buf.get_i32()?;
            let global_len = buf.get_u8()? as usize;
            let global_id = buf.get_bytes(global_len)?;
            let branch_len = buf.get_u8()? as usize;
            let branch_qualifier = buf.get_bytes(branch_len)?;
            Self::new(format_id, global_id, branch_qualifier).map_err(|err| {
                Error::new(ErrorKind::MalformedEncoding)
                    .with_message("xid part exceeds limit")
                    .with_source(err)
            })
        })
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.format_id,
            hex::encode(&self.global_id),
            hex::encode(&self.branch_qualifier)
        )
    }
}

impl FromStr for Xid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::literal(ErrorKind::Usage, s, "xid text format:gtrid-hex:bqual-hex");
        let mut parts = s.splitn(3, ':');
        let (Some(format_id), Some(global_id), Some(branch_qualifier)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let format_id = format_id.parse::<i32>().map_err(|_| invalid())?;
        let global_id = hex::decode(global_id).map_err(|err| invalid().with_source(err))?;
        let branch_qualifier =
            hex::decode(branch_qualifier).map_err(|err| invalid().with_source(err))?;
        Self::new(format_id, global_id, branch_qualifier)
    }
}
