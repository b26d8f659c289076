//! Key transitions and the legacy messages synthesized from them.
//!
//! The packed parameter word of a legacy keyboard message is a compatibility
//! boundary: applications decode its bits against a fixed external contract,
//! so every field here has externally mandated semantics and the encoding
//! must be bit-exact.

use ::deku::prelude::*;

use crate::host::DeviceHandle;

/// Legacy message identifier for a key press.
pub const WM_KEYDOWN: u32 = 0x0100;
/// Legacy message identifier for a key release.
pub const WM_KEYUP: u32 = 0x0101;
/// Legacy message identifier for a key press in system context.
pub const WM_SYSKEYDOWN: u32 = 0x0104;
/// Legacy message identifier for a key release in system context.
pub const WM_SYSKEYUP: u32 = 0x0105;

/// The four legacy keyboard transition kinds.
///
/// The `Sys*` variants indicate system key context: the key was pressed
/// together with Alt, or while no window held input focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// An ordinary key press.
    KeyDown,
    /// An ordinary key release.
    KeyUp,
    /// A key press in system key context.
    SysKeyDown,
    /// A key release in system key context.
    SysKeyUp,
}

impl TransitionKind {
    /// `true` for the key-down class of transitions (make), `false` for the
    /// key-up class (break).
    pub const fn is_press(self) -> bool {
        matches!(self, Self::KeyDown | Self::SysKeyDown)
    }

    /// `true` for transitions in system key context.
    pub const fn is_system(self) -> bool {
        matches!(self, Self::SysKeyDown | Self::SysKeyUp)
    }

    /// The legacy message identifier for this transition kind.
    pub const fn message(self) -> u32 {
        match self {
            Self::KeyDown => WM_KEYDOWN,
            Self::KeyUp => WM_KEYUP,
            Self::SysKeyDown => WM_SYSKEYDOWN,
            Self::SysKeyUp => WM_SYSKEYUP,
        }
    }

    /// Maps a legacy message identifier back to a transition kind. Any other
    /// message identifier belongs to default handling, not to this core.
    pub const fn from_message(message: u32) -> Option<Self> {
        match message {
            WM_KEYDOWN => Some(Self::KeyDown),
            WM_KEYUP => Some(Self::KeyUp),
            WM_SYSKEYDOWN => Some(Self::SysKeyDown),
            WM_SYSKEYUP => Some(Self::SysKeyUp),
            _ => None,
        }
    }
}

/// A single decoded physical key transition.
///
/// Produced by [`crate::input::raw::decode`], consumed synchronously by the
/// consumption gate and the synthesizer within the same dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyTransition {
    /// The transition kind announced by the device report.
    pub kind: TransitionKind,
    /// Virtual key code in `[0, 255]`. May be a generic modifier that still
    /// needs left/right disambiguation.
    pub virtual_key: u16,
    /// Device-relative scan code, stable per physical key.
    pub scan_code: u8,
    /// Whether the key belongs to the extended set (right Ctrl/Alt,
    /// navigation cluster, ...).
    pub is_extended: bool,
    /// The device the report originated from.
    pub device: DeviceHandle,
}

/// Struct representation of the legacy keystroke message flags.
///
/// Message flag bitfield definition:
/// <https://learn.microsoft.com/en-us/windows/win32/inputdev/about-keyboard-input#keystroke-message-flags>
#[derive(Clone, Copy, Debug, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "big")]
pub struct KeystrokeFlags {
    /// Bit 31. The transition state. The value is 1 if the key is being
    /// released, or it is 0 if the key is being pressed.
    #[deku(bits = "1")]
    pub is_key_release: bool,

    /// Bit 30. The previous key state. The value is 1 if the key is down
    /// before the message is sent, or it is 0 if the key is up.
    #[deku(bits = "1")]
    pub was_previous_state_down: bool,

    /// Bit 29. The context code: 1 if the message belongs to system key
    /// context with a focused window, otherwise 0.
    #[deku(bits = "1")]
    pub is_alt_context: bool,

    /// Bit 24. Indicates whether the key is an extended key, such as the
    /// right-hand ALT and CTRL keys that appear on an enhanced 101- or
    /// 102-key keyboard. The value is 1 if it is an extended key;
    /// otherwise, it is 0.
    #[deku(pad_bits_before = "4", bits = "1")]
    pub is_extended_key: bool,

    /// Bits 16-23. The scan code. The value depends on the OEM.
    pub scan_code: u8,

    /// Bits 0-15. The repeat count. Synthesized messages fix this at 1: one
    /// message is generated per report, including auto-repeats.
    #[deku(bits = "16")]
    pub repeat_count: u16,
}

impl KeystrokeFlags {
    /// Packs the flag word for a synthesized transition.
    ///
    /// `was_down` feeds the previous-state bit of the press variants;
    /// releases always carry previous-state and transition-state set. The
    /// context bit is set for system transitions only while a window holds
    /// focus.
    pub(crate) fn pack(
        kind: TransitionKind,
        scan_code: u8,
        is_extended: bool,
        was_down: bool,
        window_has_focus: bool,
    ) -> Self {
        let is_release = !kind.is_press();
        Self {
            is_key_release: is_release,
            was_previous_state_down: is_release || was_down,
            is_alt_context: kind.is_system() && window_has_focus,
            is_extended_key: is_extended,
            scan_code,
            repeat_count: 1,
        }
    }
}

impl From<KeystrokeFlags> for u32 {
    fn from(flags: KeystrokeFlags) -> Self {
        let bytes = flags
            .to_bytes()
            .expect("keystroke flags always fit a four byte word");
        u32::from_be_bytes(
            bytes
                .try_into()
                .expect("keystroke flags always fit a four byte word"),
        )
    }
}

impl From<u32> for KeystrokeFlags {
    fn from(word: u32) -> Self {
        Self::from_bytes((&word.to_be_bytes(), 0))
            .expect("any four byte word is a valid flag field")
            .1
    }
}

impl From<isize> for KeystrokeFlags {
    fn from(lparam: isize) -> Self {
        (lparam as u32).into()
    }
}

/// A synthesized legacy keyboard message, ready to post to a window queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacyMessage {
    /// The message kind, one-to-one with the legacy message identifier.
    pub kind: TransitionKind,
    /// The virtual key carried in the message's primary parameter.
    pub virtual_key: u16,
    /// The packed secondary parameter word.
    pub param: u32,
}

impl LegacyMessage {
    /// Decodes the packed parameter word back into its flag fields.
    pub fn flags(&self) -> KeystrokeFlags {
        self.param.into()
    }
}
