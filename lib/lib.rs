pub mod config;
pub mod consts;
pub mod model;
pub mod netutils;

pub use config::*;
pub use model::*;
