//! End-to-end wiring of the synthesis pipeline.
//!
//! One dispatch loop, owned by the host application, pulls raw reports and
//! legacy-shaped messages off the host queue in arrival order and feeds them
//! through here. The pipeline owns all mutable state (the key state table,
//! the consumption gate's flag, the active hotkey scheme) and is confined to
//! that single thread; updates therefore happen in a total order matching
//! physical key transition order, which downstream state readers rely on.

use ::tracing::trace;

use crate::{
    host::{LocaleHost, MessageSink, ScanCodeResolver, WindowFocus, WindowHandle},
    input::{
        keyboard::{
            ConsumptionPolicy, Interception, KeyStateTable, KeyTransition, LegacyMessage,
            LocaleHotkeyInterceptor, MessageSynthesizer, SynthOutcome,
            SETTING_CHANGE_LANGUAGE_TOGGLE,
        },
        raw::{self, DecodedReport},
    },
};

/// What became of one raw report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The buffer was not a decodable keyboard transition; the caller should
    /// hand the original input to default handling.
    NotApplicable,
    /// An upstream layer consumed the transition; no legacy message was
    /// synthesized.
    Consumed,
    /// A legacy message was synthesized and posted.
    Posted {
        /// The receiver window.
        target: WindowHandle,
        /// The message as posted.
        message: LegacyMessage,
    },
    /// A legacy message was synthesized but no receiver window existed.
    Dropped(LegacyMessage),
}

impl From<SynthOutcome> for ReportOutcome {
    fn from(outcome: SynthOutcome) -> Self {
        match outcome {
            SynthOutcome::Posted { target, message } => Self::Posted { target, message },
            SynthOutcome::Dropped(message) => Self::Dropped(message),
        }
    }
}

/// The assembled synthesis pipeline: decoder, consumption gate, synthesizer,
/// state table, and locale hotkey interceptor.
///
/// Generic over the host services `H` and the upstream consumption policy
/// `P` so that deployments plug in their real collaborators and tests plug
/// in fakes.
pub struct InputPipeline<H, P> {
    host: H,
    policy: P,
    keys: KeyStateTable,
    synthesizer: MessageSynthesizer,
    interceptor: LocaleHotkeyInterceptor,
}

impl<H, P> InputPipeline<H, P>
where
    H: WindowFocus + ScanCodeResolver + MessageSink + LocaleHost,
    P: ConsumptionPolicy,
{
    /// Assembles a pipeline with a fresh, all-zero key state table and the
    /// hotkey scheme currently stored by the host.
    pub fn new(host: H, policy: P) -> Self {
        let interceptor = LocaleHotkeyInterceptor::new(&host);
        Self {
            host,
            policy,
            keys: KeyStateTable::new(),
            synthesizer: MessageSynthesizer::new(),
            interceptor,
        }
    }

    /// Feeds one raw report buffer through decode, the consumption gate, and
    /// the synthesizer.
    pub fn process_report(&mut self, buffer: &[u8]) -> ReportOutcome {
        match raw::decode(buffer) {
            DecodedReport::NotApplicable => ReportOutcome::NotApplicable,
            DecodedReport::Keyboard(transition) => self.process_transition(&transition),
        }
    }

    /// Feeds one already-decoded transition through the gate and the
    /// synthesizer. Hosts that receive structured transitions rather than
    /// opaque buffers enter here.
    pub fn process_transition(&mut self, transition: &KeyTransition) -> ReportOutcome {
        if self.policy.consumes(transition) {
            trace!(
                virtual_key = transition.virtual_key,
                "Transition consumed upstream, suppressing legacy message"
            );
            return ReportOutcome::Consumed;
        }

        self.synthesizer
            .synthesize(transition, &mut self.keys, &mut self.host)
            .into()
    }

    /// Inspects a legacy-shaped message pulled from the host queue before it
    /// is dispatched. [`Interception::Swallowed`] means the message completed
    /// a locale chord (the cycle action has already fired) and must not be
    /// dispatched.
    pub fn intercept_message(&mut self, message: &LegacyMessage) -> Interception {
        self.interceptor
            .intercept(message, &self.keys, &mut self.host)
    }

    /// Handles a system-wide setting-change notification. Only the language
    /// toggle sub-code refreshes the hotkey scheme.
    pub fn handle_setting_change(&mut self, subcode: u32) {
        if subcode == SETTING_CHANGE_LANGUAGE_TOGGLE {
            self.interceptor.refresh(&self.host);
        }
    }

    /// Handles an application-activation transition, re-reading the hotkey
    /// scheme in case it changed while the application was inactive.
    pub fn handle_activation(&mut self) {
        self.interceptor.refresh(&self.host);
    }

    /// Read access to the key state table for out-of-band queries
    /// (accelerators, character composition, toggle-key logic).
    pub fn key_state(&self) -> &KeyStateTable {
        &self.keys
    }

    /// The locale hotkey scheme currently in effect.
    pub fn hotkey_scheme(&self) -> crate::input::keyboard::HotkeyScheme {
        self.interceptor.scheme()
    }

    /// The host services, for callers that need to reach collaborators
    /// through the pipeline.
    pub fn host(&self) -> &H {
        &self.host
    }
}
