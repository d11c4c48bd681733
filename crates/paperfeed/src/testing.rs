//! A local HTTP server answering one request with a canned response.

use tokio::{
  io::{AsyncReadExt, AsyncWriteExt},
  net::{TcpListener, TcpStream},
};

/// Answers the next request with `status` (e.g. `"503 Service Unavailable"`) and `body`.
///
/// Returns the server's base URL, `http://127.0.0.1:<port>`.
pub async fn serve_once(status: &'static str, body: &'static str) -> String {
  let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
  let addr = listener.local_addr().unwrap();

  tokio::spawn(async move {
    let (mut socket, _) = listener.accept().await.unwrap();
    read_request(&mut socket).await;
    let response = format!(
      "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: \
       close\r\n\r\n{body}",
      body.len()
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.shutdown().await.ok();
  });

  format!("http://{addr}")
}

/// Reads a full request, headers and body, so the connection is not reset on close.
async fn read_request(socket: &mut TcpStream) {
  let mut data = Vec::new();
  let mut chunk = [0u8; 4096];
  loop {
    let n = socket.read(&mut chunk).await.unwrap_or(0);
    if n == 0 {
      return;
    }
    data.extend_from_slice(&chunk[..n]);

    let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
      continue;
    };
    let headers = String::from_utf8_lossy(&data[..end]);
    let length = headers
      .lines()
      .filter_map(|line| line.split_once(':'))
      .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
      .and_then(|(_, value)| value.trim().parse::<usize>().ok())
      .unwrap_or(0);
    if data.len() >= end + 4 + length {
      return;
    }
  }
}
