pub mod client;
pub mod parsing;
pub mod rate_limiter;
