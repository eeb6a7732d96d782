//! HTTP status classification.
//!
//! Maps a status code to a [`StatusClass`] and an [`ErrorCode`] carrying a
//! human-readable description. Pure functions, no I/O.

use std::borrow::Cow;
use std::fmt;

/// Status codes the executor retries.
pub const RETRYABLE_STATUSES: [u16; 6] = [429, 500, 501, 502, 503, 504];

/// Outcome class of a single HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx.
    Success,
    /// Transient failure worth retrying.
    Retryable,
    /// Any other non-2xx status.
    Permanent,
}

/// A status code together with its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode {
    status: u16,
    description: Cow<'static, str>,
}

impl ErrorCode {
    /// Looks up the description for `status`, synthesizing one for unknown codes.
    pub fn from_status(status: u16) -> Self {
        let description = match describe(status) {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(format!("Unrecognized HTTP status {}", status)),
        };
        Self {
            status,
            description,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether this status appears in the well-known table.
    pub fn is_known(&self) -> bool {
        describe(self.status).is_some()
    }

    pub fn is_retryable(&self) -> bool {
        class_of(self.status) == StatusClass::Retryable
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// A classified response status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub class: StatusClass,
    pub code: ErrorCode,
}

/// Classifies `status` and attaches its error code.
pub fn classify(status: u16) -> Classification {
    Classification {
        class: class_of(status),
        code: ErrorCode::from_status(status),
    }
}

/// Classifies `status` without building the error code.
pub fn class_of(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        s if RETRYABLE_STATUSES.contains(&s) => StatusClass::Retryable,
        _ => StatusClass::Permanent,
    }
}

fn describe(status: u16) -> Option<&'static str> {
    let text = match status {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        103 => "Early Hints",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        421 => "Misdirected Request",
        422 => "Unprocessable Entity",
        423 => "Locked",
        424 => "Failed Dependency",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        599 => "Network Connect Timeout Error",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        let c = classify(404);
        assert_eq!(c.class, StatusClass::Permanent);
        assert_eq!(c.code.description(), "Not Found");
        assert_eq!(c.code.status(), 404);
    }

    #[test]
    fn test_classify_service_unavailable() {
        let c = classify(503);
        assert_eq!(c.class, StatusClass::Retryable);
        assert_eq!(c.code.description(), "Service Unavailable");
    }

    #[test]
    fn test_classify_unknown_code_falls_back() {
        let c = classify(999);
        assert_eq!(c.class, StatusClass::Permanent);
        assert!(!c.code.is_known());
        assert_eq!(c.code.description(), "Unrecognized HTTP status 999");
    }

    #[test]
    fn test_retryable_set() {
        for status in RETRYABLE_STATUSES {
            assert_eq!(class_of(status), StatusClass::Retryable, "{}", status);
        }
        for status in [400, 401, 403, 404, 409, 505, 599] {
            assert_eq!(class_of(status), StatusClass::Permanent, "{}", status);
        }
    }

    #[test]
    fn test_every_code_has_exactly_one_class() {
        for status in 100..=599u16 {
            let class = class_of(status);
            if (200..=299).contains(&status) {
                assert_eq!(class, StatusClass::Success, "{}", status);
            } else {
                assert_ne!(class, StatusClass::Success, "{}", status);
            }
            assert_eq!(classify(status).class, class);
        }
    }

    #[test]
    fn test_table_oddities() {
        assert_eq!(ErrorCode::from_status(418).description(), "I'm a teapot");
        assert_eq!(
            ErrorCode::from_status(451).description(),
            "Unavailable For Legal Reasons"
        );
        assert!(ErrorCode::from_status(599).is_known());
    }

    #[test]
    fn test_table_size() {
        let known = (100..=599u16).filter(|s| describe(*s).is_some()).count();
        assert!(known >= 60, "only {} known codes", known);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::from_status(429).to_string(), "Too Many Requests");
    }
}
