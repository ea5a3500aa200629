// Public Headers. Those will be seen by our users.
pub static REQUEST_ID_HEADER: &str = "x-roster-request-id";
