//! CGI response document.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Status reported for every echo.
pub const STATUS_OK: &str = "200 OK";

/// Content type reported for every echo.
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Response written back to the invoking server.
///
/// Encoded as CGI header lines, a blank line, then the payload with one
/// trailing newline:
///
/// ```text
/// Status: 200 OK
/// Content-Type: text/plain
///
/// <payload>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: &'static str,
    content_type: &'static str,
    payload: Bytes,
}

impl Response {
    /// Build the response that echoes `payload`.
    pub fn echo(payload: impl Into<Bytes>) -> Self {
        Response {
            status: STATUS_OK,
            content_type: CONTENT_TYPE_TEXT,
            payload: payload.into(),
        }
    }

    pub fn status(&self) -> &str {
        self.status
    }

    pub fn content_type(&self) -> &str {
        self.content_type
    }

    /// The echoed bytes, without the trailing newline.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Number of bytes `encode` appends.
    pub fn encoded_len(&self) -> usize {
        "Status: \n".len()
            + self.status.len()
            + "Content-Type: \n".len()
            + self.content_type.len()
            + 1
            + self.payload.len()
            + 1
    }

    /// Append the encoded response to `out`.
    pub fn encode(&self, out: &mut BytesMut) {
        out.reserve(self.encoded_len());
        out.extend_from_slice(b"Status: ");
        out.extend_from_slice(self.status.as_bytes());
        out.extend_from_slice(b"\nContent-Type: ");
        out.extend_from_slice(self.content_type.as_bytes());
        out.extend_from_slice(b"\n\n");
        out.extend_from_slice(&self.payload);
        out.extend_from_slice(b"\n");
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut out);
        out.freeze()
    }

    /// Write the encoded response and flush.
    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        writer.write_all(&self.to_bytes()).await?;
        writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_hello() {
        let response = Response::echo(&b"hello"[..]);
        assert_eq!(
            &response.to_bytes()[..],
            b"Status: 200 OK\nContent-Type: text/plain\n\nhello\n"
        );
    }

    #[test]
    fn test_encode_empty() {
        let response = Response::echo(Bytes::new());
        assert_eq!(
            &response.to_bytes()[..],
            b"Status: 200 OK\nContent-Type: text/plain\n\n\n"
        );
    }

    #[test]
    fn test_encode_appends() {
        let mut out = BytesMut::from(&b"prefix|"[..]);
        Response::echo(&b"x"[..]).encode(&mut out);
        assert_eq!(
            &out[..],
            b"prefix|Status: 200 OK\nContent-Type: text/plain\n\nx\n"
        );
    }

    #[test]
    fn test_encoded_len_matches() {
        for payload in [
            &b""[..],
            &b"a"[..],
            &b"hello world"[..],
            &b"\x00\xff\r\n"[..],
        ] {
            let response = Response::echo(payload);
            assert_eq!(response.encoded_len(), response.to_bytes().len());
        }
    }

    #[test]
    fn test_payload_is_untouched() {
        let raw = &b"\xff\xfe\r\n\x00line\n"[..];
        let response = Response::echo(raw);
        assert_eq!(response.status(), "200 OK");
        assert_eq!(response.content_type(), "text/plain");
        assert_eq!(&response.payload()[..], raw);
        assert!(response.to_bytes().ends_with(b"\x00line\n\n"));
    }

    #[tokio::test]
    async fn test_write_to() {
        let mut out: Vec<u8> = Vec::new();
        Response::echo(&b"hi"[..]).write_to(&mut out).await.unwrap();
        assert_eq!(out, b"Status: 200 OK\nContent-Type: text/plain\n\nhi\n");
    }
}
