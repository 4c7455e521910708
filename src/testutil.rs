//! Canned-response HTTP stub for exercising the client and panels without a
//! live backend. Each queued response answers exactly one request; requests
//! are recorded for assertions.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub struct StubServer {
    base_url: String,
    handle: Option<JoinHandle<Vec<RecordedRequest>>>,
}

/// Spawn a listener that serves the given `(status, body)` responses in
/// order, then exits. Responses close the connection, so every request
/// arrives on a fresh accept.
pub fn stub_server(responses: Vec<(u16, String)>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");
    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => break,
            };
            recorded.push(read_request(&mut stream));
            let reason = if status < 400 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
        recorded
    });
    StubServer {
        base_url: format!("http://{}", addr),
        handle: Some(handle),
    }
}

impl StubServer {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wait for all queued responses to be consumed and return the recorded
    /// requests in arrival order.
    pub fn finish(mut self) -> Vec<RecordedRequest> {
        self.handle
            .take()
            .expect("stub already finished")
            .join()
            .expect("stub thread panicked")
    }
}

fn read_request(stream: &mut TcpStream) -> RecordedRequest {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stub stream"));

    let mut request_line = String::new();
    reader.read_line(&mut request_line).expect("request line");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).expect("request header");
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        let lower = header.to_ascii_lowercase();
        if let Some(value) = lower.strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).expect("request body");
    }

    RecordedRequest {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}
