//! The process-wide per-virtual-key state table.

/// Number of entries in the key state table. Entries are indexed by virtual
/// key code; codes outside the table are never stored.
pub const KEY_STATE_ENTRIES: usize = 256;

/// Bit 7 of a state byte: the key is currently held down.
const DOWN_BIT: u8 = 0x80;
/// Bit 0 of a state byte: flips on every key-down of the code. Gives toggle
/// keys (Caps Lock et al.) their semantics; maintained uniformly for all
/// codes to match the external table layout.
const TOGGLE_BIT: u8 = 0x01;

/// The 256-entry virtual key state table.
///
/// Posted keyboard messages do not update the host's own thread keyboard
/// state, so a synthesis layer has to maintain this table itself for
/// accelerators, character composition, and toggle-key logic to keep
/// working. The byte layout per entry (down on bit 7, toggle on bit 0) is
/// the external contract those readers decode.
///
/// The table is process-global in spirit and intentionally device-unaware:
/// downstream consumers expect one table regardless of how many keyboards
/// feed it. It is owned by the pipeline and mutated only from the single
/// thread that pumps reports, in report arrival order. Exposing it to other
/// threads is the embedder's concern and requires an external lock.
#[derive(Clone)]
pub struct KeyStateTable {
    keys: [u8; KEY_STATE_ENTRIES],
}

impl Default for KeyStateTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStateTable {
    /// Constructs a fresh table with every entry zeroed: no key down, no key
    /// toggled.
    pub fn new() -> Self {
        Self {
            keys: [0; KEY_STATE_ENTRIES],
        }
    }

    /// Returns `true` if the key is currently recorded as held down.
    ///
    /// Virtual keys outside the table always read as up.
    pub fn is_down(&self, virtual_key: u16) -> bool {
        self.entry(virtual_key)
            .is_some_and(|state| state & DOWN_BIT != 0)
    }

    /// Returns `true` if the key's toggle bit is currently set.
    pub fn is_toggled(&self, virtual_key: u16) -> bool {
        self.entry(virtual_key)
            .is_some_and(|state| state & TOGGLE_BIT != 0)
    }

    /// Records a key transition for a single virtual key code.
    ///
    /// A press sets the down bit and flips the toggle bit; a release clears
    /// the down bit and leaves the toggle bit alone. Virtual keys outside
    /// the table are ignored.
    pub(crate) fn apply(&mut self, virtual_key: u16, is_down: bool) {
        let Some(state) = self.keys.get_mut(usize::from(virtual_key)) else {
            return;
        };
        if is_down {
            *state = DOWN_BIT | (TOGGLE_BIT ^ (*state & TOGGLE_BIT));
        } else {
            *state &= !DOWN_BIT;
        }
    }

    /// The raw 256-byte view of the table, in the externally mandated
    /// layout. Suitable for handing to host APIs that consume a full
    /// keyboard state array.
    pub fn snapshot(&self) -> [u8; KEY_STATE_ENTRIES] {
        self.keys
    }

    /// Zeroes every entry.
    pub fn reset(&mut self) {
        self.keys = [0; KEY_STATE_ENTRIES];
    }

    fn entry(&self, virtual_key: u16) -> Option<u8> {
        self.keys.get(usize::from(virtual_key)).copied()
    }
}
