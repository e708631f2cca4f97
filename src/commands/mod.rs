pub mod check;
pub mod describe;
pub mod expiry;
pub mod ics;
pub mod occurrences;
