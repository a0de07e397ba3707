pub mod construct;
pub(crate) mod penalty;
pub mod search;
