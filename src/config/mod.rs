pub mod harness;
pub mod map;
