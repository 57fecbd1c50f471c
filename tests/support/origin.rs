//! A media origin that breaks the connection mid-body.
//!
//! wiremock always sends complete responses, so this speaks just enough
//! HTTP/1.1 over a raw `TcpListener` to declare a length it never delivers.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::socket_guard::localhost_available;

/// Serves `video/mp4` responses that declare `declared_len` bytes, send only
/// `sent`, then close the socket. Returns the media URL, or `None` when
/// loopback is unusable.
pub async fn spawn_truncating_origin(declared_len: usize, sent: Vec<u8>) -> Option<String> {
    if !localhost_available() {
        return None;
    }
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let sent = sent.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                let response_head = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: video/mp4\r\ncontent-length: {declared_len}\r\n\r\n"
                );
                if socket.write_all(response_head.as_bytes()).await.is_err() {
                    return;
                }
                if !sent.is_empty() {
                    let _ = socket.write_all(&sent).await;
                    let _ = socket.flush().await;
                    // let the partial body land as its own read before EOF
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
            });
        }
    });

    Some(format!("http://{addr}/clip.mp4"))
}
