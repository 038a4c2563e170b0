mod common;

use common::TestClient;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn read_to_end(mut stream: TcpStream) -> Vec<u8> {
    let mut data = Vec::new();
    stream.read_to_end(&mut data).await.unwrap();
    data
}

#[tokio::test]
async fn passive_upload_and_size() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;

    assert_eq!(client.cmd("TYPE I").await, "200 Type set to binary\r\n");
    let reply = client.cmd("PASV").await;
    assert!(reply.starts_with("227 Entering Passive Mode (127,0,0,1,"), "{}", reply);
    let port = common::pasv_port(&reply);

    let mut data_conn = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let reply = client.cmd("STOR hello.txt").await;
    assert_eq!(reply, "150 Data transfer starting\r\n");

    data_conn.write_all(b"hello\n").await.unwrap();
    drop(data_conn);

    let reply = client.read_reply().await;
    assert_eq!(reply, "226 Transfer complete\r\n");

    assert_eq!(client.cmd("SIZE hello.txt").await, "213 6\r\n");
    assert_eq!(std::fs::read(root.path().join("hello.txt")).unwrap(), b"hello\n");
}

#[tokio::test]
async fn passive_download_roundtrip() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("data.bin"), b"roundtrip payload").unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;
    client.cmd("TYPE I").await;

    let reply = client.cmd("EPSV").await;
    assert!(reply.starts_with("229 Entering Extended Passive Mode (|||"), "{}", reply);
    let port = common::epsv_port(&reply);

    let data_conn = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let reply = client.cmd("RETR data.bin").await;
    assert_eq!(reply, "150 Data transfer starting\r\n");

    assert_eq!(read_to_end(data_conn).await, b"roundtrip payload");
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");
}

#[tokio::test]
async fn rest_resumes_a_retrieve_and_is_consumed() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("f"), b"abcdef").unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;
    client.cmd("TYPE I").await;

    let reply = client.cmd("REST 3").await;
    assert!(reply.starts_with("350 "), "{}", reply);

    let reply = client.cmd("EPSV").await;
    let data_conn = TcpStream::connect(("127.0.0.1", common::epsv_port(&reply))).await.unwrap();
    assert_eq!(client.cmd("RETR /f").await, "150 Data transfer starting\r\n");
    assert_eq!(read_to_end(data_conn).await, b"def");
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");

    // The offset was consumed by that RETR.
    let reply = client.cmd("EPSV").await;
    let data_conn = TcpStream::connect(("127.0.0.1", common::epsv_port(&reply))).await.unwrap();
    assert_eq!(client.cmd("RETR /f").await, "150 Data transfer starting\r\n");
    assert_eq!(read_to_end(data_conn).await, b"abcdef");
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");
}

#[tokio::test]
async fn rest_survives_non_retr_commands() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("f"), b"abcdef").unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;
    client.cmd("TYPE I").await;

    let reply = client.cmd("REST 3").await;
    assert!(reply.starts_with("350 "), "{}", reply);

    // A STOR refused for lack of a data connection must not eat the offset.
    let reply = client.cmd("STOR other.txt").await;
    assert!(reply.starts_with("425 "), "{}", reply);

    // Neither does a listing that runs to completion.
    let reply = client.cmd("EPSV").await;
    let data_conn = TcpStream::connect(("127.0.0.1", common::epsv_port(&reply))).await.unwrap();
    assert_eq!(client.cmd("LIST").await, "150 Data transfer starting\r\n");
    read_to_end(data_conn).await;
    assert_eq!(client.read_reply().await, "226 Closing data connection\r\n");

    // Nor an upload that runs to completion.
    let reply = client.cmd("EPSV").await;
    let mut data_conn = TcpStream::connect(("127.0.0.1", common::epsv_port(&reply))).await.unwrap();
    assert_eq!(client.cmd("STOR other.txt").await, "150 Data transfer starting\r\n");
    data_conn.write_all(b"unrelated").await.unwrap();
    drop(data_conn);
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");

    // The RETR that finally comes still starts at byte 3.
    let reply = client.cmd("EPSV").await;
    let data_conn = TcpStream::connect(("127.0.0.1", common::epsv_port(&reply))).await.unwrap();
    assert_eq!(client.cmd("RETR /f").await, "150 Data transfer starting\r\n");
    assert_eq!(read_to_end(data_conn).await, b"def");
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");
}

#[tokio::test]
async fn appe_appends_to_an_existing_file() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("log.txt"), b"one").unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;
    client.cmd("TYPE I").await;

    let reply = client.cmd("EPSV").await;
    let mut data_conn = TcpStream::connect(("127.0.0.1", common::epsv_port(&reply))).await.unwrap();
    assert_eq!(client.cmd("APPE log.txt").await, "150 Data transfer starting\r\n");
    data_conn.write_all(b"two").await.unwrap();
    drop(data_conn);
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");

    assert_eq!(std::fs::read(root.path().join("log.txt")).unwrap(), b"onetwo");
}

#[tokio::test]
async fn active_mode_download() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("f"), b"active payload").unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;
    client.cmd("TYPE I").await;

    // We play the active-mode client: listen and let the server dial us.
    let data_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = data_listener.local_addr().unwrap().port();
    let reply = client.cmd(&format!("PORT 127,0,0,1,{},{}", port >> 8, port & 0xff)).await;
    assert_eq!(reply, "200 PORT command successful\r\n");

    assert_eq!(client.cmd("RETR /f").await, "150 Data transfer starting\r\n");
    let (data_conn, _) = data_listener.accept().await.unwrap();
    assert_eq!(read_to_end(data_conn).await, b"active payload");
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");
}

#[tokio::test]
async fn eprt_with_unsupported_family_replies_522() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;

    let reply = client.cmd("EPRT |3|fe80::1|6000|").await;
    assert!(reply.starts_with("522 "), "{}", reply);
    let reply = client.cmd("EPRT |1|127.0.0.1|6000|").await;
    assert!(reply.starts_with("200 "), "{}", reply);
}

#[tokio::test]
async fn data_bearing_command_without_endpoint_replies_425() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("f"), b"x").unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;

    let reply = client.cmd("RETR /f").await;
    assert!(reply.starts_with("425 "), "{}", reply);

    // The endpoint is single-shot: a second transfer needs a new PASV.
    let reply = client.cmd("EPSV").await;
    let data_conn = TcpStream::connect(("127.0.0.1", common::epsv_port(&reply))).await.unwrap();
    assert_eq!(client.cmd("RETR /f").await, "150 Data transfer starting\r\n");
    assert_eq!(read_to_end(data_conn).await, b"x");
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");

    let reply = client.cmd("RETR /f").await;
    assert!(reply.starts_with("425 "), "{}", reply);
}

#[tokio::test]
async fn stou_stores_under_a_server_chosen_name() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;
    client.cmd("TYPE I").await;

    let reply = client.cmd("EPSV").await;
    let mut data_conn = TcpStream::connect(("127.0.0.1", common::epsv_port(&reply))).await.unwrap();
    let reply = client.cmd("STOU").await;
    assert!(reply.starts_with("150 FILE: "), "{}", reply);
    let filename = reply.trim_start_matches("150 FILE: ").trim().to_string();

    data_conn.write_all(b"unique").await.unwrap();
    drop(data_conn);
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");

    assert_eq!(std::fs::read(root.path().join(&filename)).unwrap(), b"unique");
}

#[tokio::test]
async fn list_and_nlst_show_directory_contents() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("visible.txt"), b"1234").unwrap();
    std::fs::create_dir(root.path().join("subdir")).unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;

    let reply = client.cmd("EPSV").await;
    let data_conn = TcpStream::connect(("127.0.0.1", common::epsv_port(&reply))).await.unwrap();
    assert_eq!(client.cmd("LIST").await, "150 Data transfer starting\r\n");
    let listing = String::from_utf8(read_to_end(data_conn).await).unwrap();
    assert_eq!(client.read_reply().await, "226 Closing data connection\r\n");

    let file_line = listing.lines().find(|l| l.ends_with("visible.txt")).expect("file missing from LIST");
    assert!(file_line.starts_with("-rw-r--r-- 1 root"), "unexpected LIST line: {}", file_line);
    assert!(file_line.contains(" 4 "), "size missing in: {}", file_line);
    let dir_line = listing.lines().find(|l| l.ends_with("subdir")).expect("dir missing from LIST");
    assert!(dir_line.starts_with('d'), "unexpected LIST line: {}", dir_line);

    let reply = client.cmd("EPSV").await;
    let data_conn = TcpStream::connect(("127.0.0.1", common::epsv_port(&reply))).await.unwrap();
    assert_eq!(client.cmd("NLST").await, "150 Data transfer starting\r\n");
    let listing = String::from_utf8(read_to_end(data_conn).await).unwrap();
    assert_eq!(client.read_reply().await, "226 Closing data connection\r\n");

    let mut names: Vec<&str> = listing.lines().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["subdir", "visible.txt"]);
}

#[tokio::test]
async fn abor_without_transfer_is_acknowledged() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;

    assert_eq!(client.cmd("ABOR").await, "226 ABOR command successful\r\n");

    // ABOR also discards a passive listener nobody connected to.
    let reply = client.cmd("EPSV").await;
    assert!(reply.starts_with("229 "), "{}", reply);
    assert_eq!(client.cmd("ABOR").await, "226 ABOR command successful\r\n");
    let reply = client.cmd("LIST").await;
    assert!(reply.starts_with("425 "), "{}", reply);
}
