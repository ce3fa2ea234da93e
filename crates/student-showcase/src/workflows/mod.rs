pub mod seed;
pub mod showcase;
