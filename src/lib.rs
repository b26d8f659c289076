//! Reconstruction of the legacy Win32 keyboard message stream from raw input
//! reports.
//!
//! When a keyboard is registered for raw input in no-legacy mode, Windows
//! stops synthesizing the traditional `WM_KEYDOWN`/`WM_KEYUP` family of
//! messages for it. Any window procedure, accelerator table, or character
//! composition logic downstream of that registration goes blind. `keywire`
//! rebuilds that stream: it decodes each raw keyboard report, asks an
//! upstream consumption policy whether the event was claimed, and - if not -
//! synthesizes a bit-exact legacy message and keeps a 256-entry key state
//! table consistent so that out-of-band key state queries keep working.
//!
//! The crate is split along the natural seams of that pipeline:
//!
//! * [`input::raw`] decodes an opaque report buffer into a
//!   [`KeyTransition`](input::keyboard::KeyTransition).
//! * [`input::keyboard`] holds the state table, the message synthesizer, the
//!   consumption gate, and the locale hotkey interceptor.
//! * [`pipeline`] wires the components together in arrival order.
//! * [`host`] defines the interfaces onto the windowing environment (focus
//!   queries, message posting, scan code resolution, locale control). A real
//!   Win32 implementation lives in [`win32`]; tests substitute fakes.
//!
//! Everything runs on the single thread that pumps the host message queue.
//! None of the types here lock: the ordering guarantee for state table
//! updates falls directly out of processing reports in arrival order.

pub mod errors;
pub mod host;
pub mod input;
pub mod pipeline;

#[cfg(windows)]
pub mod win32;
