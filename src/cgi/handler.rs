//! Echo handler.

use bytes::{Bytes, BytesMut};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, trace, warn};

use super::env::CgiEnv;
use super::response::Response;

/// Largest single read from the body stream.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Limits applied while reading the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Upper bound on the declared length. `None` trusts `CONTENT_LENGTH`.
    pub max_content_length: Option<u64>,
    /// Give up on the body after this long and echo what arrived.
    pub read_timeout: Option<Duration>,
}

/// Reads a request body and echoes it back.
///
/// Holds no per-request state; one handler can serve any number of
/// independent requests.
#[derive(Debug, Clone, Default)]
pub struct Handler {
    options: HandlerOptions,
}

impl Handler {
    pub fn new(options: HandlerOptions) -> Self {
        Handler { options }
    }

    /// Read up to `CONTENT_LENGTH` bytes from `input` and build the echo.
    ///
    /// Never fails: a missing or malformed length echoes nothing, and a
    /// stream that ends, errors, or stalls past the read timeout echoes
    /// whatever was read before that point.
    pub async fn handle<R>(&self, env: &CgiEnv, input: R) -> Response
    where
        R: AsyncRead + Unpin,
    {
        let declared = env.content_length();
        let length = match self.options.max_content_length {
            Some(max) if declared > max => {
                warn!(
                    declared,
                    max, "CONTENT_LENGTH exceeds configured maximum, truncating"
                );
                max
            }
            _ => declared,
        };

        debug!(
            method = env.request_method().unwrap_or("-"),
            script = env.script_name().unwrap_or("-"),
            content_type = env.content_type().unwrap_or("-"),
            query = env.query_string().unwrap_or(""),
            protocol = env.server_protocol().unwrap_or("-"),
            gateway = env.gateway_interface().unwrap_or("-"),
            length,
            "Handling CGI request"
        );

        if length == 0 {
            return Response::echo(Bytes::new());
        }

        let mut buffer = BytesMut::with_capacity(initial_capacity(length));
        let mut reader = input.take(length);

        match self.options.read_timeout {
            Some(timeout) => {
                if tokio::time::timeout(timeout, read_body(&mut reader, &mut buffer))
                    .await
                    .is_err()
                {
                    warn!(
                        timeout = ?timeout,
                        read = buffer.len(),
                        expected = length,
                        "Timed out reading request body, echoing partial body"
                    );
                }
            }
            None => read_body(&mut reader, &mut buffer).await,
        }

        if (buffer.len() as u64) < length {
            debug!(
                read = buffer.len(),
                expected = length,
                "Request body shorter than CONTENT_LENGTH"
            );
        }

        Response::echo(buffer.freeze())
    }
}

/// Handle one request and write the encoded response to `output`.
///
/// Only errors from writing the response are returned.
pub async fn respond<R, W>(
    handler: &Handler,
    env: &CgiEnv,
    input: R,
    output: &mut W,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    let response = handler.handle(env, input).await;
    trace!(
        status = response.status(),
        content_type = response.content_type(),
        bytes = response.payload().len(),
        "Writing response"
    );
    response.write_to(output).await
}

/// Drain `reader` into `buffer` until EOF or the first hard error.
///
/// The reader must already be bounded to the declared length.
async fn read_body<R>(reader: &mut R, buffer: &mut BytesMut)
where
    R: AsyncRead + Unpin,
{
    loop {
        buffer.reserve(READ_CHUNK_SIZE);
        match reader.read_buf(buffer).await {
            Ok(0) => break,
            Ok(n) => trace!(n, total = buffer.len(), "Read body chunk"),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(
                    error = %e,
                    read = buffer.len(),
                    "Failed reading request body, echoing partial body"
                );
                break;
            }
        }
    }
}

fn initial_capacity(length: u64) -> usize {
    usize::try_from(length)
        .unwrap_or(usize::MAX)
        .min(READ_CHUNK_SIZE)
}
