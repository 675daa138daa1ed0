//! Audit trail for asset requests.
//!
//! Every request ends in exactly one [`record`] call. Events go to the
//! `audit` tracing target so they can be routed separately from request
//! tracing.

use std::net::SocketAddr;

use axum::http::HeaderMap;
use tracing::{error, info, warn};

/// Header set by the reverse proxy in front of the server.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// How an asset request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Served,
    NotFound,
    /// Resolved path escaped its namespace root.
    Forbidden,
}

impl Outcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Served => "served",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
        }
    }
}

/// Who to attribute a request to in the audit trail.
///
/// A non-empty `X-Forwarded-For` value wins over the transport peer, since
/// the server normally sits behind a proxy. The value is recorded verbatim
/// and is never used for an access decision.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|p| p.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Record the outcome of one asset request.
///
/// `Served` logs at INFO, `NotFound` at WARN, `Forbidden` at ERROR with
/// `security_violation = true`.
pub fn record(client: &str, namespace: &str, path: &str, outcome: Outcome) {
    let result = outcome.as_str();
    match outcome {
        Outcome::Served => {
            info!(target: "audit", client, namespace, path, outcome = result, "asset served");
        }
        Outcome::NotFound => {
            warn!(target: "audit", client, namespace, path, outcome = result, "asset not found");
        }
        Outcome::Forbidden => {
            error!(
                target: "audit",
                client,
                namespace,
                path,
                outcome = result,
                security_violation = true,
                "path escapes namespace root"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let buf = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buf.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn peer() -> SocketAddr {
        "10.0.0.7:51234".parse().unwrap()
    }

    #[test]
    fn forwarded_for_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static(" 203.0.113.9 "));
        assert_eq!(client_identity(&headers, Some(peer())), "203.0.113.9");
    }

    #[test]
    fn peer_used_without_header() {
        assert_eq!(client_identity(&HeaderMap::new(), Some(peer())), "10.0.0.7");

        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static(""));
        assert_eq!(client_identity(&headers, Some(peer())), "10.0.0.7");
    }

    #[test]
    fn unknown_without_header_or_peer() {
        assert_eq!(client_identity(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn served_is_info() {
        let out = capture(|| record("10.0.0.7", "fw", "/fw/vcu.bin", Outcome::Served));
        assert!(out.contains("INFO"), "got: {out}");
        assert!(out.contains("outcome=\"served\""), "got: {out}");
        assert!(out.contains("client=\"10.0.0.7\""), "got: {out}");
    }

    #[test]
    fn not_found_is_warn() {
        let out = capture(|| record("c", "images", "/images/x.png", Outcome::NotFound));
        assert!(out.contains("WARN"), "got: {out}");
        assert!(out.contains("/images/x.png"), "got: {out}");
    }

    #[test]
    fn forbidden_is_error_and_flagged() {
        let out = capture(|| {
            record("c", "fw", "/fw/../../etc/passwd", Outcome::Forbidden);
        });
        assert!(out.contains("ERROR"), "got: {out}");
        assert!(out.contains("security_violation=true"), "got: {out}");
    }
}
