//! The save path: multipart POST to the page URL and classification of
//! whatever comes back.
//!
//! Response-shape sniffing lives in exactly one place,
//! [`classify_response`]; everything else works with [`SaveResult`].

mod dispatcher;
mod error;
mod response;

pub use dispatcher::{SaveDispatcher, Saver, build_http_client, csrf_from_cookie_header};
pub use error::TransportError;
pub use response::{MissingStatusPolicy, RawResponse, SaveResult, classify_response};
