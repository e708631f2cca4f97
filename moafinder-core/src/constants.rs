/// Number of days ahead to look for occurrences when no horizon is given
pub const DEFAULT_HORIZON_DAYS: i64 = 90;

/// Product identifier written into generated ICS files
pub const ICS_PRODID: &str = "MOAFINDER";

/// Domain suffix for generated occurrence UIDs
pub const UID_DOMAIN: &str = "moafinder";
