pub mod map;
pub mod latch;

pub use map::{check_binding, InputMap};
pub use latch::KeyLatch;
