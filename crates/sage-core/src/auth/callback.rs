//! Loopback listener for the browser login redirect.
//!
//! The identity service returns tokens in the URL fragment, and browsers
//! never send fragments to a server. The listener answers the first request
//! (`GET /callback`) with a small page whose script re-issues the fragment
//! as a query string (`GET /complete?...`); the second request carries the
//! tokens, and the listener rebuilds the fragment URL the identity service
//! originally produced so it can be resolved like any other redirect.

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use url::Url;

/// How long the login flow waits for the browser to come back.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(180);

const BRIDGE_PAGE: &str = "<html><body><p>Completing login&hellip;</p>\
<script>location.replace('/complete?' + location.hash.slice(1));</script>\
</body></html>";

const SUCCESS_PAGE: &str = "<html><body><h1>Login complete</h1>\
<p>You can close this window and return to the terminal.</p>\
<script>history.replaceState(null, document.title, '/');</script>\
</body></html>";

const NOT_FOUND_PAGE: &str = "<html><body><p>Not found.</p></body></html>";

/// Waits for the browser login redirect on the loopback port.
///
/// Returns the rebuilt redirect URL, or `None` on timeout or if the port
/// cannot be bound. The blocking accept loop runs on its own thread so the
/// caller's runtime stays responsive.
pub async fn wait_for_redirect(port: u16, timeout: Duration) -> Option<Url> {
    let (tx, rx) = tokio::sync::oneshot::channel();

    thread::spawn(move || {
        let _ = tx.send(listen_once(port, timeout));
    });

    // The thread enforces the real deadline; the extra second covers the
    // handoff back to the runtime.
    match tokio::time::timeout(timeout + Duration::from_secs(1), rx).await {
        Ok(Ok(url)) => url,
        _ => None,
    }
}

fn listen_once(port: u16, timeout: Duration) -> Option<Url> {
    let listener = TcpListener::bind(("127.0.0.1", port)).ok()?;
    listener.set_nonblocking(true).ok()?;

    let deadline = Instant::now() + timeout;
    loop {
        if Instant::now() >= deadline {
            return None;
        }
        match listener.accept() {
            Ok((stream, _)) => {
                if let Some(url) = handle_connection(stream, port) {
                    return Some(url);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(100));
            }
            Err(_) => return None,
        }
    }
}

/// Serves one request. Returns the rebuilt redirect URL once the bridge
/// delivers it; `None` keeps the listener going.
fn handle_connection(mut stream: TcpStream, port: u16) -> Option<Url> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));

    let mut buffer = [0u8; 8192];
    let n = stream.read(&mut buffer).ok()?;
    let request = String::from_utf8_lossy(&buffer[..n]);

    let target = parse_request_target(&request);
    match target.as_ref().map(Url::path) {
        Some("/callback") => {
            let _ = stream.write_all(http_response("200 OK", BRIDGE_PAGE).as_bytes());
            None
        }
        Some("/complete") => {
            let url = rebuilt_redirect(port, target.as_ref().and_then(|u| u.query()));
            let _ = stream.write_all(http_response("200 OK", SUCCESS_PAGE).as_bytes());
            url
        }
        _ => {
            let _ = stream.write_all(http_response("404 Not Found", NOT_FOUND_PAGE).as_bytes());
            None
        }
    }
}

fn parse_request_target(request: &str) -> Option<Url> {
    let request_line = request.lines().next()?;
    let path = request_line.split_whitespace().nth(1)?;
    Url::parse(&format!("http://localhost{path}")).ok()
}

/// Puts the query the bridge sent back where the identity service put it:
/// in the fragment.
fn rebuilt_redirect(port: u16, query: Option<&str>) -> Option<Url> {
    let mut url = Url::parse(&format!("http://127.0.0.1:{port}/callback")).ok()?;
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.set_fragment(Some(query));
    }
    Some(url)
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::resolver;

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    fn send_request(port: u16, target: &str) -> String {
        // The listener may still be binding; give it a moment.
        let mut stream = None;
        for _ in 0..50 {
            match TcpStream::connect(("127.0.0.1", port)) {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(_) => thread::sleep(Duration::from_millis(50)),
            }
        }
        let mut stream = stream.expect("listener did not come up");
        stream
            .write_all(format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n").as_bytes())
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_parse_request_target() {
        let url = parse_request_target("GET /callback HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        assert_eq!(url.path(), "/callback");

        let url =
            parse_request_target("GET /complete?access_token=abc HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(url.path(), "/complete");
        assert_eq!(url.query(), Some("access_token=abc"));

        assert!(parse_request_target("").is_none());
        assert!(parse_request_target("GET").is_none());
    }

    #[test]
    fn test_rebuilt_redirect_restores_fragment() {
        let url = rebuilt_redirect(8400, Some("access_token=a&refresh_token=b")).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8400/callback#access_token=a&refresh_token=b");
        assert!(resolver::has_token_fragment(&url));
    }

    #[test]
    fn test_rebuilt_redirect_without_tokens() {
        let url = rebuilt_redirect(8400, None).unwrap();
        assert_eq!(url.fragment(), None);
        let url = rebuilt_redirect(8400, Some("")).unwrap();
        assert_eq!(url.fragment(), None);
    }

    /// Full handshake: the bridge page answers `/callback`, and the
    /// follow-up `/complete` request finishes the wait with the rebuilt URL.
    #[tokio::test]
    async fn test_wait_for_redirect_handshake() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let port = free_port();
        let wait = tokio::spawn(wait_for_redirect(port, Duration::from_secs(10)));

        let client = tokio::task::spawn_blocking(move || {
            let bridge = send_request(port, "/callback");
            assert!(bridge.contains("location.replace"));

            let done = send_request(port, "/complete?access_token=tok-1&expires_in=3600");
            assert!(done.contains("Login complete"));
        });
        client.await.unwrap();

        let url = wait.await.unwrap().expect("redirect URL");
        assert_eq!(
            url.fragment(),
            Some("access_token=tok-1&expires_in=3600")
        );
        assert!(resolver::has_token_fragment(&url));
    }

    #[tokio::test]
    async fn test_wait_for_redirect_times_out() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let port = free_port();
        let url = wait_for_redirect(port, Duration::from_millis(300)).await;
        assert!(url.is_none());
    }
}
