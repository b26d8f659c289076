//! Virtual key codes that the synthesis core must recognize by name.
//!
//! The state table itself is indexed by raw virtual key code and does not
//! care what the codes mean. The modifier keys are the exception: generic
//! Shift/Control/Menu entries must be kept in sync with their handed
//! left/right shadow entries, so those codes are modelled as a proper enum.

use ::strum::{EnumIter, FromRepr};

use crate::host::ScanCodeResolver;

/// Virtual key code of the grave/tilde key (`VK_OEM_3` on a US layout),
/// used by the grave-key locale hotkey scheme.
pub const VK_GRAVE: u16 = 0xC0;

/// The modifier virtual keys subject to left/right disambiguation.
///
/// The discriminants are the Win32 virtual key codes. The generic variants
/// are what arrives in a raw keyboard report; the handed variants are the
/// shadow entries the synthesizer derives from scan code or extended flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, FromRepr)]
#[repr(u16)]
pub enum ModifierKey {
    /// Generic Shift, either hand.
    Shift = 0x10,
    /// Generic Control, either hand.
    Control = 0x11,
    /// Generic Alt (`VK_MENU`), either hand.
    Menu = 0x12,
    /// Left-hand Shift.
    LeftShift = 0xA0,
    /// Right-hand Shift.
    RightShift = 0xA1,
    /// Left-hand Control.
    LeftControl = 0xA2,
    /// Right-hand Control.
    RightControl = 0xA3,
    /// Left-hand Alt.
    LeftMenu = 0xA4,
    /// Right-hand Alt.
    RightMenu = 0xA5,
}

impl ModifierKey {
    /// The raw virtual key code for this modifier.
    pub const fn value(self) -> u16 {
        self as u16
    }

    /// Returns the modifier for a raw virtual key code, if it is one.
    pub fn from_virtual_key(virtual_key: u16) -> Option<Self> {
        Self::from_repr(virtual_key)
    }

    /// `true` for the ambiguous generic variants which require a handed
    /// shadow entry in the state table.
    pub const fn is_generic(self) -> bool {
        matches!(self, Self::Shift | Self::Control | Self::Menu)
    }
}

/// Resolves a generic modifier key to its handed left/right counterpart.
///
/// Shift cannot be disambiguated from the extended flag (both shift keys are
/// non-extended), so the scan code is resolved through the host's scan code
/// service instead: a scan code that maps to right Shift selects the right
/// entry, everything else selects the left. Control and Menu carry the
/// extended flag on their right-hand keys.
///
/// Handed keys resolve to themselves.
pub fn resolve_handed<R>(key: ModifierKey, scan_code: u8, is_extended: bool, scans: &R) -> ModifierKey
where
    R: ScanCodeResolver + ?Sized,
{
    match key {
        ModifierKey::Shift => {
            if scans.virtual_key_for_scan(scan_code) == ModifierKey::RightShift.value() {
                ModifierKey::RightShift
            } else {
                ModifierKey::LeftShift
            }
        }
        ModifierKey::Control => {
            if is_extended {
                ModifierKey::RightControl
            } else {
                ModifierKey::LeftControl
            }
        }
        ModifierKey::Menu => {
            if is_extended {
                ModifierKey::RightMenu
            } else {
                ModifierKey::LeftMenu
            }
        }
        handed => handed,
    }
}
