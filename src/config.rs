/// Characters of surrounding text captured on each side of a failed ISBN
pub const DEFAULT_CONTEXT_CHARS: usize = 50;

/// Maximum characters between the end of an "ISBN" token and a candidate
pub const DEFAULT_PROXIMITY: usize = 6;

/// Progress update interval (tick every N articles)
pub const PROGRESS_INTERVAL: u64 = 1000;
