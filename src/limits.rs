/// Bookings a single slot row can show per day.
pub const SLOT_CAPACITY: usize = 22;

/// First catalog slot, in minutes after midnight (08:00).
pub const FIRST_SLOT_MINUTES: u32 = 8 * 60;

/// Distance between consecutive catalog slots.
pub const SLOT_STEP_MINUTES: u32 = 40;

/// Catalog slots per day: 08:00 through 14:40.
pub const SLOTS_PER_DAY: usize = 11;

/// Phones shorter than this are partial input; no history lookup is issued.
pub const MIN_LOOKUP_PHONE_LEN: usize = 10;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_PHONE_LEN: usize = 32;

pub const HISTORY_DEBOUNCE_MS: u64 = 500;
pub const SEARCH_DEBOUNCE_MS: u64 = 300;
