//! Purpose: Structured faults raised by a transport and carried back to callers.
//! Exports: `Fault`, `FaultKind`, `Facility`, `Severity`.
//! Role: Classifies remote failures; deciding whether to retry belongs to the transport.
//! Invariants: Facility and severity codes are fixed; unknown codes are rejected, never mapped.
//! Invariants: Wire form is `kind:u8 status:u32 facility:u8 severity:u8 message:string`.
use std::fmt;

use serde::Serialize;

use crate::core::buffer::WireBuf;
use crate::core::error::{Error, ErrorKind};

/// Originating subsystem of a fault.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facility {
    #[default]
    Unspecified = 0,
    Ipc = 1,
    Rtl = 2,
    Mgr = 3,
    Svr = 4,
}

impl Facility {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::Unspecified),
            1 => Ok(Self::Ipc),
            2 => Ok(Self::Rtl),
            3 => Ok(Self::Mgr),
            4 => Ok(Self::Svr),
            _ => Err(Error::new(ErrorKind::OutOfRange)
                .with_message(format!("unknown facility code {code}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Warning = 0,
    Success = 1,
    Error = 2,
    Info = 3,
    Severe = 4,
}

impl Severity {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::Warning),
            1 => Ok(Self::Success),
            2 => Ok(Self::Error),
            3 => Ok(Self::Info),
            4 => Ok(Self::Severe),
            _ => Err(Error::new(ErrorKind::OutOfRange)
                .with_message(format!("unknown severity code {code}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Coded fault with no more specific classification.
    Transport = 0,
    NoServerReachable = 1,
    InvalidCallState = 2,
}

impl FaultKind {
    fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::Transport),
            1 => Ok(Self::NoServerReachable),
            2 => Ok(Self::InvalidCallState),
            _ => Err(Error::new(ErrorKind::MalformedEncoding)
                .with_message(format!("unknown fault kind {code}"))),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Fault {
    pub kind: FaultKind,
    pub status: u32,
    pub facility: Facility,
    pub severity: Severity,
    pub message: String,
}

impl Fault {
    pub fn new(
        status: u32,
        facility: Facility,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: FaultKind::Transport,
            status,
            facility,
            severity,
            message: message.into(),
        }
    }

    /// The remote endpoint could not be contacted.
    pub fn no_server_reachable(message: impl Into<String>) -> Self {
        Self::bare(FaultKind::NoServerReachable, message)
    }

    /// The call or context is in a state that forbids the attempted operation.
    pub fn invalid_call_state(message: impl Into<String>) -> Self {
        Self::bare(FaultKind::InvalidCallState, message)
    }

    fn bare(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: 0,
            facility: Facility::Unspecified,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn encode_into<B: WireBuf>(&self, buf: &mut B) -> Result<(), Error> {
        buf.put_u8(self.kind as u8)?;
        buf.put_u32(self.status)?;
        buf.put_u8(self.facility.code())?;
        buf.put_u8(self.severity.code())?;
        buf.put_string(&self.message)
    }

    /// Decodes one fault; on failure the cursor is left where the fault started.
    pub fn decode_from<B: WireBuf>(buf: &mut B) -> Result<Self, Error> {
        let start = buf.position();
        buf.read_record(|buf| {
            let kind = FaultKind::from_code(buf.get_u8()?)?;
            let status = buf.get_u32()?;
            let facility =
                Facility::from_code(buf.get_u8()?).map_err(|err| malformed(err, start))?;
            let severity =
                Severity::from_code(buf.get_u8()?).map_err(|err| malformed(err, start))?;
            let message = buf.get_string()?;
            Ok(Self {
                kind,
                status,
                facility,
                severity,
                message,
            })
        })
    }
}

// An unknown code read off the wire is an encoding problem, not a caller range error.
fn malformed(err: Error, start: usize) -> Error {
    Error::new(ErrorKind::MalformedEncoding)
        .with_message(err.message().unwrap_or("unknown code").to_string())
        .with_offset(start as u64)
        .with_source(err)
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} (status {}, facility {:?}, severity {:?}): {}",
            self.kind, self.status, self.facility, self.severity, self.message
        )
    }
}

impl std::error::Error for Fault {}

impl From<Fault> for Error {
    fn from(fault: Fault) -> Self {
        let kind = match fault.kind {
            FaultKind::NoServerReachable => ErrorKind::NoServerReachable,
            FaultKind::InvalidCallState => ErrorKind::InvalidCallState,
            FaultKind::Transport => ErrorKind::Internal,
        };
        Error::new(kind)
            .with_message(fault.message.clone())
            .with_source(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::{Facility, Fault, FaultKind, Severity};
    use crate::core::buffer::{ByteBuffer, WireBuf};
    use crate::core::error::{Error, ErrorKind};

    #[test]
    fn standard_variants_default_numeric_fields() {
        let fault = Fault::no_server_reachable("connect refused");
        assert_eq!(fault.kind, FaultKind::NoServerReachable);
        assert_eq!(fault.status, 0);
        assert_eq!(fault.facility.code(), 0);
        assert_eq!(fault.severity.code(), 0);
        assert_eq!(fault.message, "connect refused");

        let fault = Fault::invalid_call_state("call already completed");
        assert_eq!(fault.kind, FaultKind::InvalidCallState);
        assert_eq!(fault.status, 0);
    }

    #[test]
    fn codes_are_fixed() {
        let facilities = [
            (Facility::Unspecified, 0),
            (Facility::Ipc, 1),
            (Facility::Rtl, 2),
            (Facility::Mgr, 3),
            (Facility::Svr, 4),
        ];
        for (facility, code) in facilities {
            assert_eq!(facility.code(), code);
            assert_eq!(Facility::from_code(code).unwrap(), facility);
        }
        let severities = [
            (Severity::Warning, 0),
            (Severity::Success, 1),
            (Severity::Error, 2),
            (Severity::Info, 3),
            (Severity::Severe, 4),
        ];
        for (severity, code) in severities {
            assert_eq!(severity.code(), code);
            assert_eq!(Severity::from_code(code).unwrap(), severity);
        }
        assert_eq!(Facility::from_code(5).unwrap_err().kind(), ErrorKind::OutOfRange);
        assert_eq!(Severity::from_code(9).unwrap_err().kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn fault_survives_the_wire() {
        let fault = Fault::new(0x1234, Facility::Svr, Severity::Severe, "server crashed");
        let mut buf = ByteBuffer::new();
        fault.encode_into(&mut buf).expect("encode");
        buf.seek(0).expect("rewind");
        assert_eq!(Fault::decode_from(&mut buf).unwrap(), fault);
    }

    #[test]
    fn unknown_kind_on_the_wire_is_malformed() {
        let mut buf = ByteBuffer::new();
        buf.put_u8(7).expect("kind");
        buf.seek(0).expect("rewind");
        assert_eq!(
            Fault::decode_from(&mut buf).unwrap_err().kind(),
            ErrorKind::MalformedEncoding
        );
    }

    #[test]
    fn unknown_codes_on_the_wire_are_malformed_and_rewind() {
        for (facility, severity) in [(9u8, 0u8), (1, 7)] {
            let mut buf = ByteBuffer::new();
            buf.put_u8(0).expect("kind");
            buf.put_u32(5).expect("status");
            buf.put_u8(facility).expect("facility");
            buf.put_u8(severity).expect("severity");
            buf.put_string("x").expect("message");
            buf.seek(0).expect("rewind");
            let err = Fault::decode_from(&mut buf).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
            assert_eq!(buf.position(), 0);
        }
    }

    #[test]
    fn truncated_fault_leaves_cursor_at_record_start() {
        let fault = Fault::new(3, Facility::Ipc, Severity::Error, "lost the peer");
        let mut full = ByteBuffer::new();
        fault.encode_into(&mut full).expect("encode");
        let bytes = full.into_vec();

        let mut buf = ByteBuffer::new();
        buf.put_u8(0xEE).expect("prefix");
        buf.put_bytes(&bytes[..bytes.len() - 3]).expect("truncated");
        buf.seek(1).expect("record start");
        assert_eq!(
            Fault::decode_from(&mut buf).unwrap_err().kind(),
            ErrorKind::OutOfBounds
        );
        assert_eq!(buf.position(), 1);
    }

    #[test]
    fn fault_maps_onto_error_kind() {
        let err: Error = Fault::no_server_reachable("down").into();
        assert_eq!(err.kind(), ErrorKind::NoServerReachable);
        let err: Error = Fault::invalid_call_state("twice").into();
        assert_eq!(err.kind(), ErrorKind::InvalidCallState);
        let err: Error = Fault::new(5, Facility::Ipc, Severity::Error, "pipe").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), Some("pipe"));
    }

    #[test]
    fn serializes_with_lowercase_names() {
        let fault = Fault::new(1, Facility::Mgr, Severity::Info, "note");
        let value = serde_json::to_value(&fault).expect("json");
        assert_eq!(value["kind"], "transport");
        assert_eq!(value["facility"], "mgr");
        assert_eq!(value["severity"], "info");
    }
}
