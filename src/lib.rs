pub mod conn;
pub mod context;
pub mod server;
pub mod types;

pub use conn::{BodyReader, Connection, WriteCloser};
pub use context::{CancelHandle, Context};
pub use server::{accept, AcceptError, ResponseWriter, Server};
pub use types::*;
