#![allow(dead_code)]

use ftpkit::auth::SimpleAuth;
use ftpkit::Server;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

pub const TEST_USER: &str = "admin";
pub const TEST_PASSWORD: &str = "123456";

// Starts a server rooted at `root` on an OS-assigned loopback port and
// returns the address to dial.
pub async fn start_server(root: PathBuf) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::with_fs_root(root).authenticator(Arc::new(SimpleAuth::new(TEST_USER, TEST_PASSWORD)));
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });
    addr
}

// A bare-bones FTP control connection: send a line, read reply lines.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    // Connects and consumes the 220 greeting.
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        let mut client = TestClient {
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        let greeting = client.read_reply().await;
        assert!(greeting.starts_with("220 "), "unexpected greeting: {}", greeting);
        client
    }

    pub async fn send(&mut self, line: &str) {
        self.writer.write_all(format!("{}\r\n", line).as_bytes()).await.unwrap();
    }

    pub async fn read_reply(&mut self) -> String {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        assert!(n > 0, "control connection closed while waiting for a reply");
        line
    }

    // Sends a command and returns its (single-line) reply.
    pub async fn cmd(&mut self, line: &str) -> String {
        self.send(line).await;
        self.read_reply().await
    }

    // Sends a command and collects a possibly multi-line reply into one
    // string, using the code- / code-space bracketing.
    pub async fn cmd_multiline(&mut self, line: &str) -> String {
        self.send(line).await;
        let first = self.read_reply().await;
        if first.as_bytes().get(3) != Some(&b'-') {
            return first;
        }
        let code = first[0..3].to_string();
        let mut full = first;
        loop {
            let next = self.read_reply().await;
            let last = next.starts_with(&code) && next.as_bytes().get(3) == Some(&b' ');
            full.push_str(&next);
            if last {
                return full;
            }
        }
    }

    pub async fn login(&mut self) {
        let reply = self.cmd(&format!("USER {}", TEST_USER)).await;
        assert_eq!(reply, "331 User name ok, password required\r\n");
        let reply = self.cmd(&format!("PASS {}", TEST_PASSWORD)).await;
        assert_eq!(reply, "230 Password ok, continue\r\n");
    }
}

// Extracts the port from a `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`
// reply.
pub fn pasv_port(reply: &str) -> u16 {
    let inner = reply.split('(').nth(1).and_then(|s| s.split(')').next()).unwrap_or_else(|| panic!("no tuple in {}", reply));
    let fields: Vec<u16> = inner.split(',').map(|p| p.trim().parse().unwrap()).collect();
    assert_eq!(fields.len(), 6, "bad PASV tuple in {}", reply);
    (fields[4] << 8) | fields[5]
}

// Extracts the port from a `229 Entering Extended Passive Mode (|||p|)`
// reply.
pub fn epsv_port(reply: &str) -> u16 {
    let inner = reply.split("(|||").nth(1).and_then(|s| s.split("|)").next()).unwrap_or_else(|| panic!("no port in {}", reply));
    inner.trim().parse().unwrap()
}
