//! Decoding and state handling for keyboard input.

pub mod keyboard;
pub mod raw;
