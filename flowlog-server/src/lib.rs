pub mod replay;
pub mod signal;
