/// Token a calendar summary must contain (case and spaces ignored) to be a stay
pub const STAY_MARKER: &str = "laplace";

/// Guest text used when a destination stay has no related guest
pub const UNKNOWN_GUEST: &str = "Unknown guest";
