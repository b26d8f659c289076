//! The upstream consumption gate.
//!
//! An upstream input system gets the first look at every transition. If it
//! claims ("consumes") the event, no legacy message may be synthesized for
//! it. The policy deciding this is a strategy seam: real deployments plug in
//! an adapter that asks their actual input handler, while the alternating
//! policy below exists to emulate one in tests and demos.

use crate::input::keyboard::KeyTransition;

/// Decides, per transition, whether an upstream layer claimed the event.
///
/// Implementations are pure predicates over their own internal state; they
/// must not touch the key state table.
pub trait ConsumptionPolicy {
    /// Returns `true` if the transition was consumed upstream and no legacy
    /// message should be synthesized for it.
    fn consumes(&mut self, transition: &KeyTransition) -> bool;
}

/// Policy for deployments without an upstream handler: nothing is ever
/// consumed and every transition produces a legacy message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverConsumes;

impl ConsumptionPolicy for NeverConsumes {
    fn consumes(&mut self, _transition: &KeyTransition) -> bool {
        false
    }
}

/// Emulation policy which claims every second physical press.
///
/// The internal flag flips on each key-down-class transition before it is
/// read, so the first press is consumed, the second is not, and so on.
/// Key-up transitions never flip the flag and simply answer with its
/// current value - the release that follows a consumed press is therefore
/// consumed too, keeping presses and releases paired.
///
/// This is a test and demo stand-in, not production logic.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlternatingConsumer {
    consumed: bool,
}

impl ConsumptionPolicy for AlternatingConsumer {
    fn consumes(&mut self, transition: &KeyTransition) -> bool {
        if transition.kind.is_press() {
            self.consumed = !self.consumed;
        }
        self.consumed
    }
}
