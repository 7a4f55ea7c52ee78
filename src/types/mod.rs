pub mod addr;
pub mod error;
pub mod request;

pub use addr::EndpointPair;
pub use error::DuplexError;
pub use request::Request;
