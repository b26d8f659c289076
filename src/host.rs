//! Interfaces onto the host windowing environment.
//!
//! The synthesis core never calls the operating system directly. Every
//! out-of-band query it depends on - "which window has focus", "what virtual
//! key does this scan code map to", "post this message", "what is the stored
//! locale hotkey setting" - is expressed as a small trait here. The real
//! Win32 implementations live in [`crate::win32`]; unit tests substitute
//! in-memory fakes.

use crate::{errors::Result, input::keyboard::LegacyMessage};

/// An opaque handle to a host window. Only ever compared and passed back to
/// the host; the core never dereferences it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// An opaque handle identifying the device a raw report originated from.
///
/// The key state table is intentionally device-unaware (it mirrors a
/// process-global contract), but consumption policies may discriminate on
/// the source device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeviceHandle(pub isize);

/// Synchronous window focus queries.
pub trait WindowFocus {
    /// The window which currently holds keyboard focus, if any.
    fn focused_window(&self) -> Option<WindowHandle>;

    /// The active window attached to the calling thread's message queue, if
    /// any. Used as the fallback receiver when no window holds focus.
    fn active_window(&self) -> Option<WindowHandle>;
}

/// Resolution of device scan codes to handed virtual keys.
///
/// This is the service behind left/right disambiguation of the generic Shift
/// key, equivalent to `MapVirtualKey` with `MAPVK_VSC_TO_VK_EX`.
pub trait ScanCodeResolver {
    /// Returns the handed virtual key code for a scan code, or `0` if the
    /// scan code does not map to any key.
    fn virtual_key_for_scan(&self, scan_code: u8) -> u16;
}

/// Destination for synthesized legacy messages.
pub trait MessageSink {
    /// Posts a legacy keyboard message to the target window's queue.
    fn post(&mut self, target: WindowHandle, message: &LegacyMessage);
}

/// Access to the host's locale switching machinery.
pub trait LocaleHost {
    /// Reads the stored locale hotkey setting as its raw numeric value, or
    /// `None` if the setting is absent or unreadable.
    fn hotkey_setting(&self) -> Option<u32>;

    /// Cycles the input locale to the next installed layout.
    fn cycle_input_locale(&mut self);
}

/// Whether the host should still synthesize its own legacy messages for
/// registered keyboards, or suppress them so this crate can take over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationMode {
    /// Host-generated legacy messages are left intact.
    WithLegacy,
    /// Host-generated legacy messages are suppressed at the source.
    NoLegacy,
}

/// Registration of the keyboard device class for raw input delivery.
///
/// Registration failure is the one fatal error class in this crate: it is
/// reported to the operator at startup rather than handled.
pub trait DeviceRegistrar {
    /// Registers keyboards for raw input delivery in the given mode.
    fn register(&mut self, mode: RegistrationMode) -> Result<()>;

    /// Removes a previous raw input registration.
    fn unregister(&mut self) -> Result<()>;
}
