mod common;

use common::TestClient;

#[tokio::test]
async fn login_and_pwd() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;

    let reply = client.cmd("PWD").await;
    assert_eq!(reply, "257 \"/\" is current directory\r\n");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    let reply = client.cmd("USER admin").await;
    assert!(reply.starts_with("331 "), "{}", reply);
    let reply = client.cmd("PASS nope").await;
    assert!(reply.starts_with("530 "), "{}", reply);

    // A fresh USER is required before the next PASS.
    let reply = client.cmd("PASS 123456").await;
    assert!(reply.starts_with("503 "), "{}", reply);

    // And a correct retry still works.
    client.login().await;
}

#[tokio::test]
async fn most_commands_require_login() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    for cmd in ["PWD", "CWD /", "PASV", "RETR x", "STOR x", "LIST", "DELE x", "MKD d", "SIZE x", "REST 1", "PROT P"] {
        let reply = client.cmd(cmd).await;
        assert!(reply.starts_with("530 "), "{} should need login, got {}", cmd, reply);
    }
}

#[tokio::test]
async fn service_commands_work_before_login() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    assert_eq!(client.cmd("NOOP").await, "200 NOOP ok\r\n");
    assert_eq!(client.cmd("SYST").await, "215 UNIX Type: L8\r\n");
    let feat = client.cmd_multiline("FEAT").await;
    assert!(feat.starts_with("211-"), "{}", feat);
    for feature in ["SIZE", "MDTM", "REST STREAM", "EPRT", "EPSV", "UTF8"] {
        assert!(feat.contains(&format!(" {}\r\n", feature)), "FEAT misses {}: {}", feature, feat);
    }
}

#[tokio::test]
async fn user_while_logged_in_restages_login() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;

    let reply = client.cmd("USER admin").await;
    assert!(reply.starts_with("331 "), "{}", reply);
    // Auth state was dropped along with the staged user.
    let reply = client.cmd("PWD").await;
    assert!(reply.starts_with("530 "), "{}", reply);
    let reply = client.cmd("PASS 123456").await;
    assert!(reply.starts_with("230 "), "{}", reply);
}

#[tokio::test]
async fn quit_closes_the_session() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    let reply = client.cmd("QUIT").await;
    assert!(reply.starts_with("221 "), "{}", reply);
}

#[tokio::test]
async fn rein_resets_the_session() {
    let root = tempfile::tempdir().unwrap();
    let addr = common::start_server(root.path().to_path_buf()).await;

    let mut client = TestClient::connect(addr).await;
    client.login().await;

    let reply = client.cmd("REIN").await;
    assert!(reply.starts_with("220 "), "{}", reply);
    let reply = client.cmd("PWD").await;
    assert!(reply.starts_with("530 "), "{}", reply);
    client.login().await;
}
