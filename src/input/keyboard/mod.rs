//! The keyboard synthesis core: state table, consumption gate, message
//! synthesizer, and locale hotkey interceptor.

mod codes;
mod event;
mod gate;
mod locale;
mod state;
mod synth;

pub use codes::*;
pub use event::*;
pub use gate::*;
pub use locale::*;
pub use state::*;
pub use synth::*;
