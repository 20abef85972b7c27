//! CGI meta-variables.
//!
//! The invoking server describes the request through environment variables
//! (RFC 3875 section 4.1). Only `CONTENT_LENGTH` affects the response; the
//! rest are read for logging.

use std::collections::HashMap;

pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";
pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
pub const QUERY_STRING: &str = "QUERY_STRING";
pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
pub const SERVER_PROTOCOL: &str = "SERVER_PROTOCOL";
pub const GATEWAY_INTERFACE: &str = "GATEWAY_INTERFACE";

/// Snapshot of the environment a CGI request was invoked with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CgiEnv {
    vars: HashMap<String, String>,
}

impl CgiEnv {
    /// Capture the current process environment.
    ///
    /// Values that are not valid UTF-8 are converted lossily.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }

    /// Raw value of a variable, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Declared body length. Missing or malformed values count as zero.
    pub fn content_length(&self) -> u64 {
        parse_content_length(self.get(CONTENT_LENGTH))
    }

    pub fn request_method(&self) -> Option<&str> {
        self.non_empty(REQUEST_METHOD)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.non_empty(CONTENT_TYPE)
    }

    pub fn query_string(&self) -> Option<&str> {
        self.non_empty(QUERY_STRING)
    }

    pub fn script_name(&self) -> Option<&str> {
        self.non_empty(SCRIPT_NAME)
    }

    pub fn server_protocol(&self) -> Option<&str> {
        self.non_empty(SERVER_PROTOCOL)
    }

    pub fn gateway_interface(&self) -> Option<&str> {
        self.non_empty(GATEWAY_INTERFACE)
    }

    fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for CgiEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        CgiEnv {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse a `CONTENT_LENGTH` value as a base-10 byte count.
///
/// Negative values clamp to zero and values past `u64::MAX` saturate.
/// Anything that is not an optionally signed run of ASCII digits is zero.
pub fn parse_content_length(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };

    let trimmed = raw.trim_ascii();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }

    if negative {
        return 0;
    }

    digits.parse().unwrap_or(u64::MAX)
}
