pub mod model;

pub use model::{Origin, Transaction};
