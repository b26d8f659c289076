//! Locale-switch hotkey interception.
//!
//! With legacy message generation suppressed at the source, the host's
//! built-in language-toggle chord detection (Alt+Shift, Ctrl+Shift, or the
//! grave key) no longer fires: it runs off the low-level hook path that a
//! no-legacy registration bypasses. This module re-implements the chord
//! detection over the synthesized message stream, keyed off the key state
//! table the synthesizer already maintains.

use ::strum::FromRepr;
use ::tap::Pipe;
use ::tracing::debug;

use crate::{
    host::LocaleHost,
    input::keyboard::{KeyStateTable, LegacyMessage, ModifierKey, VK_GRAVE},
};

/// Sub-code carried by a system-wide setting-change notification when the
/// language toggle hotkey configuration changed (`SPI_SETLANGTOGGLE`).
pub const SETTING_CHANGE_LANGUAGE_TOGGLE: u32 = 0x005B;

/// The configured locale hotkey scheme.
///
/// Discriminants match the numeric values of the host's stored setting. An
/// absent or unrecognized setting falls back to [`AltShift`], the host's own
/// default.
///
/// [`AltShift`]: Self::AltShift
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, FromRepr)]
#[repr(u32)]
pub enum HotkeyScheme {
    /// Alt+Shift cycles the locale.
    #[default]
    AltShift = 1,
    /// Ctrl+Shift cycles the locale.
    CtrlShift = 2,
    /// No locale hotkey.
    Disabled = 3,
    /// The grave key cycles the locale.
    Grave = 4,
}

impl HotkeyScheme {
    /// Interprets a raw stored setting value, falling back to the default
    /// scheme when the value is absent or unrecognized. Never an error.
    pub fn from_setting(value: Option<u32>) -> Self {
        value.and_then(Self::from_repr).unwrap_or_default()
    }
}

/// Whether an intercepted message may proceed to dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interception {
    /// The message is not part of a locale chord; forward it unchanged.
    Forward,
    /// The message completed (or must not leak from) a locale chord and has
    /// been swallowed.
    Swallowed,
}

/// Watches the synthesized message stream for the configured locale chord.
#[derive(Clone, Copy, Debug)]
pub struct LocaleHotkeyInterceptor {
    scheme: HotkeyScheme,
}

impl LocaleHotkeyInterceptor {
    /// Constructs an interceptor with the scheme currently stored by the
    /// host.
    pub fn new<H: LocaleHost>(host: &H) -> Self {
        Self {
            scheme: host.hotkey_setting().pipe(HotkeyScheme::from_setting),
        }
    }

    /// The currently active scheme.
    pub fn scheme(&self) -> HotkeyScheme {
        self.scheme
    }

    /// Re-reads the stored scheme. Called on a setting-change notification
    /// carrying [`SETTING_CHANGE_LANGUAGE_TOGGLE`] and on application
    /// activation, which covers settings changed while the window was
    /// inactive.
    pub fn refresh<H: LocaleHost>(&mut self, host: &H) {
        let scheme = host.hotkey_setting().pipe(HotkeyScheme::from_setting);
        if scheme != self.scheme {
            debug!(?scheme, "Locale hotkey scheme changed");
            self.scheme = scheme;
        }
    }

    /// Inspects one legacy-shaped message before it is forwarded to the
    /// message queue.
    ///
    /// Fires at most one locale-cycle action per completed chord. Swallowed
    /// messages must not reach dispatch; in the grave scheme even the
    /// key-down is swallowed so the key generates no character.
    pub fn intercept<H: LocaleHost>(
        &self,
        message: &LegacyMessage,
        keys: &KeyStateTable,
        host: &mut H,
    ) -> Interception {
        match self.scheme {
            HotkeyScheme::Disabled => Interception::Forward,
            HotkeyScheme::Grave => self.intercept_grave(message, host),
            HotkeyScheme::AltShift => {
                self.intercept_chord(message, keys, ModifierKey::Menu, host)
            }
            HotkeyScheme::CtrlShift => {
                self.intercept_chord(message, keys, ModifierKey::Control, host)
            }
        }
    }

    fn intercept_grave<H: LocaleHost>(
        &self,
        message: &LegacyMessage,
        host: &mut H,
    ) -> Interception {
        if message.virtual_key != VK_GRAVE {
            return Interception::Forward;
        }
        if !message.kind.is_press() {
            debug!("Grave locale hotkey fired");
            host.cycle_input_locale();
        }
        // The press is swallowed too so the key never produces a character.
        Interception::Swallowed
    }

    fn intercept_chord<H: LocaleHost>(
        &self,
        message: &LegacyMessage,
        keys: &KeyStateTable,
        partner: ModifierKey,
        host: &mut H,
    ) -> Interception {
        let shift_release = !message.kind.is_press()
            && message.virtual_key == ModifierKey::Shift.value();
        if shift_release && keys.is_down(partner.value()) {
            debug!(?partner, "Modifier locale hotkey fired");
            host.cycle_input_locale();
            Interception::Swallowed
        } else {
            Interception::Forward
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::input::keyboard::TransitionKind;
    use ::pretty_assertions::assert_eq;

    struct FakeLocaleHost {
        setting: Option<u32>,
        cycles: usize,
    }

    impl FakeLocaleHost {
        fn new(setting: Option<u32>) -> Self {
            Self { setting, cycles: 0 }
        }
    }

    impl LocaleHost for FakeLocaleHost {
        fn hotkey_setting(&self) -> Option<u32> {
            self.setting
        }

        fn cycle_input_locale(&mut self) {
            self.cycles += 1;
        }
    }

    fn message(kind: TransitionKind, virtual_key: u16) -> LegacyMessage {
        LegacyMessage {
            kind,
            virtual_key,
            param: 0x0001,
        }
    }

    #[test]
    fn test_scheme_from_setting() {
        assert_eq!(HotkeyScheme::from_setting(Some(1)), HotkeyScheme::AltShift);
        assert_eq!(HotkeyScheme::from_setting(Some(2)), HotkeyScheme::CtrlShift);
        assert_eq!(HotkeyScheme::from_setting(Some(3)), HotkeyScheme::Disabled);
        assert_eq!(HotkeyScheme::from_setting(Some(4)), HotkeyScheme::Grave);
        assert_eq!(HotkeyScheme::from_setting(Some(17)), HotkeyScheme::AltShift);
        assert_eq!(HotkeyScheme::from_setting(None), HotkeyScheme::AltShift);
    }

    /// The grave scheme swallows the press outright and fires exactly one
    /// cycle on the release.
    #[test]
    fn test_grave_scheme() {
        let mut host = FakeLocaleHost::new(Some(4));
        let interceptor = LocaleHotkeyInterceptor::new(&host);
        let keys = KeyStateTable::new();

        assert_eq!(
            interceptor.intercept(&message(TransitionKind::KeyDown, VK_GRAVE), &keys, &mut host),
            Interception::Swallowed,
        );
        assert_eq!(host.cycles, 0, "press must not fire the cycle action");

        assert_eq!(
            interceptor.intercept(&message(TransitionKind::KeyUp, VK_GRAVE), &keys, &mut host),
            Interception::Swallowed,
        );
        assert_eq!(host.cycles, 1);

        // Unrelated keys pass through.
        assert_eq!(
            interceptor.intercept(&message(TransitionKind::KeyDown, 0x41), &keys, &mut host),
            Interception::Forward,
        );
    }

    /// Alt+Shift: a Shift release while Alt is down fires the cycle.
    #[test]
    fn test_alt_shift_scheme() {
        let mut host = FakeLocaleHost::new(Some(1));
        let interceptor = LocaleHotkeyInterceptor::new(&host);
        let mut keys = KeyStateTable::new();

        // Shift released with no Alt held: plain shift tap, pass through.
        let shift_up = message(TransitionKind::SysKeyUp, ModifierKey::Shift.value());
        assert_eq!(
            interceptor.intercept(&shift_up, &keys, &mut host),
            Interception::Forward,
        );

        keys.apply(ModifierKey::Menu.value(), true);
        assert_eq!(
            interceptor.intercept(&shift_up, &keys, &mut host),
            Interception::Swallowed,
        );
        assert_eq!(host.cycles, 1);

        // A Shift press while Alt is down is not the chord completion.
        let shift_down = message(TransitionKind::SysKeyDown, ModifierKey::Shift.value());
        assert_eq!(
            interceptor.intercept(&shift_down, &keys, &mut host),
            Interception::Forward,
        );
    }

    #[test]
    fn test_ctrl_shift_scheme() {
        let mut host = FakeLocaleHost::new(Some(2));
        let interceptor = LocaleHotkeyInterceptor::new(&host);
        let mut keys = KeyStateTable::new();

        keys.apply(ModifierKey::Control.value(), true);
        let shift_up = message(TransitionKind::KeyUp, ModifierKey::Shift.value());
        assert_eq!(
            interceptor.intercept(&shift_up, &keys, &mut host),
            Interception::Swallowed,
        );
        assert_eq!(host.cycles, 1);

        // Alt down does not satisfy the Ctrl+Shift chord.
        keys.apply(ModifierKey::Control.value(), false);
        keys.apply(ModifierKey::Menu.value(), true);
        assert_eq!(
            interceptor.intercept(&shift_up, &keys, &mut host),
            Interception::Forward,
        );
    }

    #[test]
    fn test_disabled_scheme_passes_everything() {
        let mut host = FakeLocaleHost::new(Some(3));
        let interceptor = LocaleHotkeyInterceptor::new(&host);
        let mut keys = KeyStateTable::new();
        keys.apply(ModifierKey::Menu.value(), true);

        for msg in [
            message(TransitionKind::KeyUp, ModifierKey::Shift.value()),
            message(TransitionKind::KeyDown, VK_GRAVE),
            message(TransitionKind::KeyUp, VK_GRAVE),
        ] {
            assert_eq!(
                interceptor.intercept(&msg, &keys, &mut host),
                Interception::Forward,
            );
        }
        assert_eq!(host.cycles, 0);
    }

    /// Refresh picks up a changed setting; an unreadable one falls back to
    /// the default scheme.
    #[test]
    fn test_refresh() {
        let mut host = FakeLocaleHost::new(Some(4));
        let mut interceptor = LocaleHotkeyInterceptor::new(&host);
        assert_eq!(interceptor.scheme(), HotkeyScheme::Grave);

        host.setting = Some(2);
        interceptor.refresh(&host);
        assert_eq!(interceptor.scheme(), HotkeyScheme::CtrlShift);

        host.setting = None;
        interceptor.refresh(&host);
        assert_eq!(interceptor.scheme(), HotkeyScheme::AltShift);
    }
}
