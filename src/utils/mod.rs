pub mod hash;
pub mod matrix;
pub mod tokens;

pub use hash::{murmur3_128, Signature};
pub use matrix::Matrix;
pub use tokens::Tokens;
