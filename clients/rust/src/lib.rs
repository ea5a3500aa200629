mod api;
pub mod client;
mod constants;
mod error;
mod poll;
mod request;

pub use roster_api_model::*;

pub use self::api::{ApiError, Response};
pub use self::client::{Client, ClientBuilder};
pub use self::constants::{BASE_URL_ENV, DEFAULT_BASE_URL};
pub use self::error::{Error, Result};
pub use self::poll::{PollOutcome, PollRequest};
pub use self::request::{
    CreateRequest,
    DeleteRequest,
    GetRequest,
    ListRequest,
    ResourceClient,
    UpdateRequest,
};
