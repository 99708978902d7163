#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

pub struct CannedResponse {
    pub status: u16,
    pub reason: &'static str,
    pub body: String,
}

impl CannedResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            reason: "OK",
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, reason: &'static str, body: &str) -> Self {
        Self {
            status,
            reason,
            body: body.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CapturedRequest {
    /// e.g. `POST /analyze HTTP/1.1`
    pub request_line: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn path(&self) -> &str {
        self.request_line.split(' ').nth(1).unwrap_or("")
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// One-shot HTTP responder: serves `responses` in order, one per connection,
/// then stops accepting.
pub fn spawn_test_http_server(
    responses: Vec<CannedResponse>,
) -> (String, Arc<Mutex<Vec<CapturedRequest>>>, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let mut queue = VecDeque::from(responses);
    let captured = Arc::new(Mutex::new(Vec::new()));
    let captured_for_thread = Arc::clone(&captured);

    let handle = thread::spawn(move || {
        while let Ok((mut stream, _)) = listener.accept() {
            let Ok(request) = read_http_request(&mut stream) else {
                break;
            };
            captured_for_thread.lock().unwrap().push(request);

            let Some(response) = queue.pop_front() else {
                break;
            };
            if write_http_response(&mut stream, &response).is_err() {
                break;
            }
            let _ = stream.shutdown(Shutdown::Both);
            if queue.is_empty() {
                break;
            }
        }
    });

    (format!("http://{addr}"), captured, handle)
}

fn read_http_request(stream: &mut TcpStream) -> std::io::Result<CapturedRequest> {
    let mut buf = [0_u8; 1024];
    let mut raw = Vec::new();
    let header_end = loop {
        let read = stream.read(&mut buf)?;
        if read == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        raw.extend_from_slice(&buf[..read]);
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        if raw.len() > 64 * 1024 {
            return Err(std::io::ErrorKind::InvalidData.into());
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while raw.len() < header_end + content_length {
        let read = stream.read(&mut buf)?;
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..read]);
    }

    let body_end = raw.len().min(header_end + content_length);
    Ok(CapturedRequest {
        request_line: head.lines().next().unwrap_or("").to_string(),
        body: String::from_utf8_lossy(&raw[header_end..body_end]).to_string(),
    })
}

fn write_http_response(stream: &mut TcpStream, response: &CannedResponse) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.reason,
        response.body.len()
    )?;
    stream.write_all(response.body.as_bytes())?;
    stream.flush()?;
    Ok(())
}
