pub mod bitset;
pub mod brent;
