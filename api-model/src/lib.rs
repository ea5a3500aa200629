mod account;
mod kind;
mod label;
mod organization;
mod pagination;
mod validation_util;

pub use account::*;
pub use kind::*;
pub use label::*;
pub use organization::*;
pub use pagination::*;
