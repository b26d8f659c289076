//! Decoding of raw keyboard input reports.
//!
//! A raw report arrives as an opaque buffer with an announced size: a fixed
//! header naming the device class, followed by a class-specific payload.
//! Anything that cannot be decoded - too small, wrong device class, a
//! malformed header, or a message identifier outside the key transition set -
//! is answered with [`DecodedReport::NotApplicable`], a pass-through sentinel
//! telling the caller to hand the original input to default handling. Decode
//! failure is terminal for that single report only; nothing retries.

use ::deku::prelude::*;
use ::tracing::trace;

use crate::{
    host::DeviceHandle,
    input::keyboard::{KeyTransition, TransitionKind},
};

/// Report type identifier for the keyboard device class.
pub const REPORT_TYPE_KEYBOARD: u32 = 1;

/// Payload flag bit marking a key from the extended set (E0 prefix).
pub const KEY_FLAG_EXTENDED: u16 = 0x02;

/// The fixed header at the front of every raw input report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct ReportHeader {
    /// Device class of the report; only [`REPORT_TYPE_KEYBOARD`] is handled
    /// here.
    pub report_type: u32,
    /// Total report size announced by the producer, header included.
    pub size: u32,
    /// Opaque handle of the originating device.
    pub device: u64,
}

/// The keyboard payload following a [`ReportHeader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct KeyboardReport {
    /// Device-relative make scan code of the key.
    pub make_code: u16,
    /// Transition flag bits; see [`KEY_FLAG_EXTENDED`].
    pub flags: u16,
    /// Reserved, always zero.
    pub reserved: u16,
    /// Virtual key code of the key.
    pub virtual_key: u16,
    /// The legacy message identifier this transition corresponds to.
    pub message: u32,
    /// Device- and host-specific extra information.
    pub extra: u32,
}

/// Result of decoding one raw report buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodedReport {
    /// A keyboard transition was decoded.
    Keyboard(KeyTransition),
    /// The buffer is not a decodable keyboard transition; pass the original
    /// input through to default handling.
    NotApplicable,
}

/// Decodes a raw report buffer into a normalized key transition.
pub fn decode(buffer: &[u8]) -> DecodedReport {
    let Ok(((payload, _), header)) = ReportHeader::from_bytes((buffer, 0)) else {
        trace!(len = buffer.len(), "Undersized raw report");
        return DecodedReport::NotApplicable;
    };

    if header.report_type != REPORT_TYPE_KEYBOARD {
        return DecodedReport::NotApplicable;
    }
    if header.size as usize > buffer.len() {
        trace!(
            announced = header.size,
            actual = buffer.len(),
            "Raw report announces more data than the buffer holds"
        );
        return DecodedReport::NotApplicable;
    }

    let Ok((_, report)) = KeyboardReport::from_bytes((payload, 0)) else {
        trace!("Truncated keyboard payload");
        return DecodedReport::NotApplicable;
    };

    let Some(kind) = TransitionKind::from_message(report.message) else {
        // Not one of the four key transition messages; default handling.
        return DecodedReport::NotApplicable;
    };

    DecodedReport::Keyboard(KeyTransition {
        kind,
        virtual_key: report.virtual_key,
        scan_code: report.make_code as u8,
        is_extended: report.flags & KEY_FLAG_EXTENDED != 0,
        device: DeviceHandle(header.device as isize),
    })
}
