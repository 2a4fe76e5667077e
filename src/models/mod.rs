// src/models/mod.rs
pub mod audit;
pub mod driver;
pub mod ride;
pub mod vehicle;

pub use audit::*;
pub use driver::*;
pub use ride::*;
pub use vehicle::*;
