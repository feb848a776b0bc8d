//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body at every path. HEAD answers with
//! Content-Length only; GET returns the body. A configurable status lets
//! tests exercise the non-success paths.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Status code for every response (200 for the happy path).
    pub status: u16,
    /// If set, the value of this request header is echoed back in the body
    /// of GET responses instead of the configured body.
    pub echo_header: Option<&'static str>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            echo_header: None,
        }
    }
}

/// Starts a server in a background thread serving `body`. Returns the base
/// URL (e.g. "http://127.0.0.1:12345/"). Runs until the process exits.
pub fn start(body: Vec<u8>) -> String {
    start_with_options(body, ServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, &body, opts));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], opts: ServerOptions) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };

    let method = request.split_whitespace().next().unwrap_or("");
    let reason = match opts.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };

    let payload: Vec<u8> = match opts.echo_header {
        Some(name) => header_value(request, name).into_bytes(),
        None => body.to_vec(),
    };

    let head_only = method.eq_ignore_ascii_case("HEAD");
    let response_head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        opts.status,
        reason,
        payload.len()
    );
    let _ = stream.write_all(response_head.as_bytes());
    if !head_only {
        let _ = stream.write_all(&payload);
    }
    let _ = stream.flush();
}

fn header_value(request: &str, name: &str) -> String {
    for line in request.lines().skip(1) {
        if let Some((k, v)) = line.split_once(':') {
            if k.trim().eq_ignore_ascii_case(name) {
                return v.trim().to_string();
            }
        }
    }
    String::new()
}
