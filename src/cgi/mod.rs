//! CGI echo implementation.
//!
//! The invoking web server runs this program once per request:
//! - Request metadata arrives as environment variables
//! - The request body arrives on stdin, `CONTENT_LENGTH` bytes long
//! - The response is written to stdout as CGI header lines and a body
//!
//! ## Response Format
//!
//! ```text
//! Status: 200 OK
//! Content-Type: text/plain
//!
//! <request body, byte for byte>
//! ```
//!
//! Every header line and the separator end in `\n`, and the body is
//! followed by one more `\n`.
//!
//! ## Length Handling
//!
//! - Missing, empty, negative or non-numeric `CONTENT_LENGTH` echoes nothing
//! - At most `CONTENT_LENGTH` bytes are read from stdin
//! - A body shorter than declared is echoed as-is, without error

pub mod env;
pub mod handler;
pub mod response;

pub use env::CgiEnv;
pub use handler::{respond, Handler, HandlerOptions};
