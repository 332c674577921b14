pub mod aggregator;
pub mod api;
pub mod collector;
pub mod doctor;
pub mod ent;
pub mod render;
#[cfg(test)]
pub(crate) mod testing;
pub use aggregator::aggregate;
pub use collector::{listen, router};
pub use doctor::*;
pub use ent::*;
