//! Provider client: identifier resolution and meal fetch against the NEIS hub.

mod client;
mod envelope;
mod error;
mod transport;

pub use client::{DEFAULT_PAGE_SIZE, NeisClient};
pub use error::{ClientError, ErrorKind};
pub use transport::{DEFAULT_BASE_URL, HttpTransport, Transport};
