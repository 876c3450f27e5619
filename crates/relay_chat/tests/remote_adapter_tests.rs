//! Integration tests for the remote chat adapter.
//!
//! Each test serves one canned HTTP response from a local listener and
//! checks both the reply and the request the adapter sent.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use relay_chat::{
    RemoteBackend, RemoteChatAdapter, RemoteReply, REMOTE_EMPTY_REPLY, REMOTE_FAILURE_REPLY,
};

struct CapturedRequest {
    head: String,
    body: serde_json::Value,
}

/// Serve a single response and hand back the request that was received.
fn serve_once(status_line: &str, body: &str) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!(
        "http://{}/v1/chat/completions",
        listener.local_addr().unwrap()
    );
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        let (head, body_start) = loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                return;
            }
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break (String::from_utf8_lossy(&raw[..pos]).to_string(), pos + 4);
            }
        };
        let length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while raw.len() < body_start + length {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }

        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        let body = serde_json::from_slice(&raw[body_start..]).unwrap_or(serde_json::Value::Null);
        let _ = tx.send(CapturedRequest { head, body });
    });

    (endpoint, rx)
}

fn adapter(endpoint: &str) -> RemoteChatAdapter {
    RemoteChatAdapter::new(endpoint, "").with_timeout(Duration::from_secs(10))
}

/// A 200 with choices yields the content and the top-level id.
#[test]
fn test_success() {
    let (endpoint, rx) = serve_once(
        "200 OK",
        r#"{"id": "abc", "choices": [{"message": {"role": "assistant", "content": "hi"}}]}"#,
    );

    let reply = adapter(&endpoint).run("hello", "deepseek", None);

    assert_eq!(reply, RemoteReply::new("hi", Some("abc".to_string())));

    let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(request.head.starts_with("POST /v1/chat/completions"));
    assert_eq!(request.body["model"], "deepseek");
    assert_eq!(request.body["messages"][0]["role"], "user");
    assert_eq!(request.body["messages"][0]["content"], "hello");
    assert_eq!(request.body["stream"], false);
    assert!(request.body.get("conversation_id").is_none());
}

/// The conversation id and auth token are sent when present.
#[test]
fn test_sends_conversation_and_token() {
    let (endpoint, rx) = serve_once(
        "200 OK",
        r#"{"id": "next", "choices": [{"message": {"content": "ok"}}]}"#,
    );

    let reply = RemoteChatAdapter::new(&endpoint, "token-123")
        .with_timeout(Duration::from_secs(10))
        .run("again", "deepseek-think", Some("prev"));

    assert_eq!(reply.conversation_id.as_deref(), Some("next"));

    let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(request.body["conversation_id"], "prev");
    assert_eq!(request.body["model"], "deepseek-think");
    assert!(request
        .head
        .lines()
        .any(|line| line.eq_ignore_ascii_case("authorization: Bearer token-123")));
}

/// Error statuses yield the failure text and no conversation id.
#[test]
fn test_not_found() {
    let (endpoint, _rx) = serve_once("404 Not Found", r#"{"error": "missing"}"#);

    let reply = adapter(&endpoint).run("hello", "deepseek", None);

    assert_eq!(reply, RemoteReply::failure(REMOTE_FAILURE_REPLY));
}

/// A 200 without choices yields the empty-reply text.
#[test]
fn test_empty_choices() {
    let (endpoint, _rx) = serve_once("200 OK", r#"{"id": "abc", "choices": []}"#);

    let reply = adapter(&endpoint).run("hello", "deepseek", None);

    assert_eq!(reply, RemoteReply::failure(REMOTE_EMPTY_REPLY));
}

/// Connection failures yield the failure text.
#[test]
fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
    drop(listener);

    let reply = adapter(&endpoint).run("hello", "deepseek", None);

    assert_eq!(reply, RemoteReply::failure(REMOTE_FAILURE_REPLY));
}
