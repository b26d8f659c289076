//! Synthesis of legacy keyboard messages from decoded transitions.

use ::tracing::trace;

use crate::{
    host::{MessageSink, ScanCodeResolver, WindowFocus, WindowHandle},
    input::keyboard::{
        resolve_handed, KeyStateTable, KeyTransition, KeystrokeFlags, LegacyMessage, ModifierKey,
        KEY_STATE_ENTRIES,
    },
};

/// Previous-state policy: repeats are synthesized as fresh presses. One
/// message is generated per raw report anyway, so a faithful repeat count
/// buys little; a known simplification carried over deliberately.
const WAS_PREVIOUSLY_DOWN: bool = false;

/// The result of synthesizing one transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthOutcome {
    /// The message was posted to a receiver window.
    Posted {
        /// The window the message was posted to.
        target: WindowHandle,
        /// The message as posted.
        message: LegacyMessage,
    },
    /// No window had focus and the thread had no active window; the message
    /// was dropped silently. Not an error.
    Dropped(LegacyMessage),
}

impl SynthOutcome {
    /// The synthesized message, whether or not it found a receiver.
    pub fn message(&self) -> &LegacyMessage {
        match self {
            Self::Posted { message, .. } | Self::Dropped(message) => message,
        }
    }
}

/// Turns unconsumed transitions into legacy messages and keeps the key state
/// table consistent.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageSynthesizer;

impl MessageSynthesizer {
    /// Constructs a synthesizer.
    pub fn new() -> Self {
        Self
    }

    /// Synthesizes the legacy message for one transition.
    ///
    /// The key state table is updated before the message is handed to the
    /// sink: a handler invoked synchronously as a result of the post must
    /// already observe the new state. Routing prefers the focused window,
    /// falls back to the thread's active window, and otherwise drops the
    /// message.
    pub fn synthesize<H>(
        &self,
        transition: &KeyTransition,
        keys: &mut KeyStateTable,
        host: &mut H,
    ) -> SynthOutcome
    where
        H: WindowFocus + ScanCodeResolver + MessageSink,
    {
        let focus = host.focused_window();
        let flags = KeystrokeFlags::pack(
            transition.kind,
            transition.scan_code,
            transition.is_extended,
            WAS_PREVIOUSLY_DOWN,
            focus.is_some(),
        );
        let message = LegacyMessage {
            kind: transition.kind,
            virtual_key: transition.virtual_key,
            param: flags.into(),
        };

        self.update_key_state(transition, keys, host);

        match focus.or_else(|| host.active_window()) {
            Some(target) => {
                host.post(target, &message);
                SynthOutcome::Posted { target, message }
            }
            None => {
                trace!(
                    virtual_key = transition.virtual_key,
                    "No receiver window, dropping synthesized message"
                );
                SynthOutcome::Dropped(message)
            }
        }
    }

    /// Records the transition in the state table, including the handed
    /// shadow entry when the virtual key is a generic modifier.
    fn update_key_state<R>(&self, transition: &KeyTransition, keys: &mut KeyStateTable, scans: &R)
    where
        R: ScanCodeResolver,
    {
        // Codes beyond the table have no state to maintain.
        if usize::from(transition.virtual_key) >= KEY_STATE_ENTRIES {
            return;
        }

        let is_down = transition.kind.is_press();
        keys.apply(transition.virtual_key, is_down);

        if let Some(generic) =
            ModifierKey::from_virtual_key(transition.virtual_key).filter(|key| key.is_generic())
        {
            let handed = resolve_handed(
                generic,
                transition.scan_code,
                transition.is_extended,
                scans,
            );
            keys.apply(handed.value(), is_down);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{host::DeviceHandle, input::keyboard::TransitionKind};
    use ::pretty_assertions::assert_eq;

    /// Host fake with scriptable focus/active windows and a post log.
    struct FakeHost {
        focused: Option<WindowHandle>,
        active: Option<WindowHandle>,
        posted: Vec<(WindowHandle, LegacyMessage)>,
    }

    impl FakeHost {
        fn new() -> Self {
            Self {
                focused: Some(WindowHandle(1)),
                active: Some(WindowHandle(2)),
                posted: Vec::new(),
            }
        }
    }

    impl WindowFocus for FakeHost {
        fn focused_window(&self) -> Option<WindowHandle> {
            self.focused
        }

        fn active_window(&self) -> Option<WindowHandle> {
            self.active
        }
    }

    impl ScanCodeResolver for FakeHost {
        fn virtual_key_for_scan(&self, scan_code: u8) -> u16 {
            match scan_code {
                0x2A => ModifierKey::LeftShift.value(),
                0x36 => ModifierKey::RightShift.value(),
                _ => 0,
            }
        }
    }

    impl MessageSink for FakeHost {
        fn post(&mut self, target: WindowHandle, message: &LegacyMessage) {
            self.posted.push((target, *message));
        }
    }

    fn transition(kind: TransitionKind, virtual_key: u16, scan_code: u8) -> KeyTransition {
        KeyTransition {
            kind,
            virtual_key,
            scan_code,
            is_extended: false,
            device: DeviceHandle::default(),
        }
    }

    #[test]
    fn test_posts_to_focused_window() {
        let mut host = FakeHost::new();
        let mut keys = KeyStateTable::new();
        let synth = MessageSynthesizer::new();

        let outcome = synth.synthesize(
            &transition(TransitionKind::KeyDown, 0x41, 0x1E),
            &mut keys,
            &mut host,
        );

        assert_eq!(
            outcome,
            SynthOutcome::Posted {
                target: WindowHandle(1),
                message: LegacyMessage {
                    kind: TransitionKind::KeyDown,
                    virtual_key: 0x41,
                    param: 0x001E_0001,
                },
            }
        );
        assert_eq!(host.posted.len(), 1);
        assert!(keys.is_down(0x41));
    }

    #[test]
    fn test_falls_back_to_active_window() {
        let mut host = FakeHost::new();
        host.focused = None;
        let mut keys = KeyStateTable::new();

        let outcome = MessageSynthesizer::new().synthesize(
            &transition(TransitionKind::KeyDown, 0x41, 0x1E),
            &mut keys,
            &mut host,
        );

        assert!(matches!(
            outcome,
            SynthOutcome::Posted {
                target: WindowHandle(2),
                ..
            }
        ));
    }

    /// With no receiver the message is dropped, but the state table is still
    /// updated.
    #[test]
    fn test_drops_without_receiver_but_keeps_state() {
        let mut host = FakeHost::new();
        host.focused = None;
        host.active = None;
        let mut keys = KeyStateTable::new();

        let outcome = MessageSynthesizer::new().synthesize(
            &transition(TransitionKind::KeyDown, 0x41, 0x1E),
            &mut keys,
            &mut host,
        );

        assert!(matches!(outcome, SynthOutcome::Dropped(_)));
        assert!(host.posted.is_empty());
        assert!(keys.is_down(0x41));
    }

    /// A generic Shift press with the left scan code sets the generic entry
    /// and the left shadow entry, and leaves the right one alone.
    #[test]
    fn test_shift_shadow_entry_left() {
        let mut host = FakeHost::new();
        let mut keys = KeyStateTable::new();

        MessageSynthesizer::new().synthesize(
            &transition(TransitionKind::KeyDown, ModifierKey::Shift.value(), 0x2A),
            &mut keys,
            &mut host,
        );

        assert!(keys.is_down(ModifierKey::Shift.value()));
        assert!(keys.is_down(ModifierKey::LeftShift.value()));
        assert!(!keys.is_down(ModifierKey::RightShift.value()));
    }

    #[test]
    fn test_shift_shadow_entry_right() {
        let mut host = FakeHost::new();
        let mut keys = KeyStateTable::new();

        MessageSynthesizer::new().synthesize(
            &transition(TransitionKind::KeyDown, ModifierKey::Shift.value(), 0x36),
            &mut keys,
            &mut host,
        );

        assert!(keys.is_down(ModifierKey::RightShift.value()));
        assert!(!keys.is_down(ModifierKey::LeftShift.value()));
    }

    /// Control and Menu shadow entries follow the extended flag.
    #[test]
    fn test_control_shadow_entry_follows_extended_flag() {
        let mut host = FakeHost::new();
        let mut keys = KeyStateTable::new();
        let synth = MessageSynthesizer::new();

        let mut press = transition(TransitionKind::KeyDown, ModifierKey::Control.value(), 0x1D);
        synth.synthesize(&press, &mut keys, &mut host);
        assert!(keys.is_down(ModifierKey::LeftControl.value()));
        assert!(!keys.is_down(ModifierKey::RightControl.value()));

        let mut release = transition(TransitionKind::KeyUp, ModifierKey::Control.value(), 0x1D);
        synth.synthesize(&release, &mut keys, &mut host);
        assert!(!keys.is_down(ModifierKey::LeftControl.value()));

        press.is_extended = true;
        synth.synthesize(&press, &mut keys, &mut host);
        assert!(keys.is_down(ModifierKey::RightControl.value()));
        assert!(!keys.is_down(ModifierKey::LeftControl.value()));

        release.is_extended = true;
        synth.synthesize(&release, &mut keys, &mut host);
        assert!(!keys.is_down(ModifierKey::RightControl.value()));
    }

    /// The release of a generic modifier clears both the generic and shadow
    /// entries.
    #[test]
    fn test_shift_release_clears_shadow() {
        let mut host = FakeHost::new();
        let mut keys = KeyStateTable::new();
        let synth = MessageSynthesizer::new();

        synth.synthesize(
            &transition(TransitionKind::KeyDown, ModifierKey::Shift.value(), 0x2A),
            &mut keys,
            &mut host,
        );
        synth.synthesize(
            &transition(TransitionKind::KeyUp, ModifierKey::Shift.value(), 0x2A),
            &mut keys,
            &mut host,
        );

        assert!(!keys.is_down(ModifierKey::Shift.value()));
        assert!(!keys.is_down(ModifierKey::LeftShift.value()));
    }

    /// System transitions pick up the context bit from focus state.
    #[test]
    fn test_system_transition_context_bit() {
        let mut host = FakeHost::new();
        let mut keys = KeyStateTable::new();

        let outcome = MessageSynthesizer::new().synthesize(
            &transition(TransitionKind::SysKeyDown, 0x48, 0x23),
            &mut keys,
            &mut host,
        );

        assert!(outcome.message().flags().is_alt_context);
    }
}
