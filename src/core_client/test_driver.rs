// Client API and interactive loop against a real session over a pipe

use super::*;
use crate::config::ServerConfig;
use crate::core_client::input::UserCommand;
use crate::core_session::{Session, SessionSettings};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{duplex, DuplexStream};

fn serve(dir: &Path) -> Client<DuplexStream> {
    let config = ServerConfig {
        shared_dir: dir.to_path_buf(),
        ..ServerConfig::default()
    };
    let settings = Arc::new(SessionSettings::from_config(&config).unwrap());
    let peer: SocketAddr = "127.0.0.1:40001".parse().unwrap();

    let (client_side, server_side) = duplex(64 * 1024);
    tokio::spawn(Session::new(server_side, peer, settings).run());
    Client::new(client_side)
}

#[tokio::test]
async fn test_client_reports_server_errors() {
    let shared = tempfile::tempdir().unwrap();
    let mut client = serve(shared.path());
    assert_eq!(
        client.read_greeting().await.unwrap(),
        "Simple FileShare Server"
    );

    let err = client.auth("wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::Server(ref line) if line == "ERR Authentication failed"));
    assert!(!err.is_fatal());

    client.auth("secret123").await.unwrap();
    let err = client.begin_download("ghost.txt").await.unwrap_err();
    assert!(matches!(err, ClientError::Server(ref line) if line == "ERR File not found"));

    // Connection is still usable
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_client_list_returns_entries() {
    let shared = tempfile::tempdir().unwrap();
    std::fs::write(shared.path().join("one.txt"), b"1").unwrap();
    std::fs::write(shared.path().join("three.txt"), b"333").unwrap();

    let mut client = serve(shared.path());
    client.read_greeting().await.unwrap();
    client.auth("secret123").await.unwrap();

    let mut files = client.list().await.unwrap();
    files.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(
        files,
        vec![
            RemoteFile {
                name: "one.txt".into(),
                size: 1
            },
            RemoteFile {
                name: "three.txt".into(),
                size: 3
            },
        ]
    );
}

#[tokio::test]
async fn test_client_list_keeps_names_starting_with_err() {
    let shared = tempfile::tempdir().unwrap();
    std::fs::write(shared.path().join("ERRATA.txt"), b"e").unwrap();
    std::fs::write(shared.path().join("ERR.log"), b"ee").unwrap();

    let mut client = serve(shared.path());
    client.read_greeting().await.unwrap();
    client.auth("secret123").await.unwrap();

    let mut names: Vec<String> = client
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["ERR.log", "ERRATA.txt"]);

    // The reply was consumed up to END, so the stream is still aligned
    assert_eq!(client.list().await.unwrap().len(), 2);
    let mut transfer = client.begin_download("ERR.log").await.unwrap();
    let mut payload = Vec::new();
    client
        .finish_download(&mut transfer, &mut payload, |_| {})
        .await
        .unwrap();
    assert_eq!(payload, b"ee");
    assert_eq!(client.quit().await.unwrap(), "BYE");
}

#[tokio::test]
async fn test_driver_session_transcript() {
    let shared = tempfile::tempdir().unwrap();
    let local = tempfile::tempdir().unwrap();
    let downloads = tempfile::tempdir().unwrap();

    let source = local.path().join("notes.txt");
    std::fs::write(&source, b"line one\nline two\n").unwrap();

    let mut client = serve(shared.path());
    client.read_greeting().await.unwrap();
    let mut driver = Driver::new(client, downloads.path().to_path_buf()).with_progress(false);

    let script = format!(
        "AUTH secret123\n\nlist\nUPLOAD {}\nDOWNLOAD notes.txt\nDOWNLOAD missing.txt\nHELP\nQUIT\nLIST\n",
        source.display()
    );
    driver.run(script.as_bytes()).await.unwrap();

    assert_eq!(
        std::fs::read(shared.path().join("notes.txt")).unwrap(),
        b"line one\nline two\n"
    );
    assert_eq!(
        std::fs::read(downloads.path().join("notes.txt")).unwrap(),
        b"line one\nline two\n"
    );
    assert!(!downloads.path().join("missing.txt").exists());
}

#[tokio::test]
async fn test_driver_refuses_missing_local_file() {
    let shared = tempfile::tempdir().unwrap();
    let mut client = serve(shared.path());
    client.read_greeting().await.unwrap();
    let mut driver = Driver::new(client, shared.path().to_path_buf()).with_progress(false);

    driver
        .execute(UserCommand::Auth("secret123".into()))
        .await
        .unwrap();
    let err = driver
        .execute(UserCommand::Upload("/definitely/not/here.bin".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::LocalFileNotFound(_)));

    // Nothing was sent, so the next request still works
    assert_eq!(
        driver.execute(UserCommand::List).await.unwrap(),
        Step::Continue
    );
    assert_eq!(driver.execute(UserCommand::Quit).await.unwrap(), Step::Stop);
}

#[tokio::test]
async fn test_driver_stops_when_server_goes_away() {
    let (client_side, server_side) = duplex(1024);
    drop(server_side);
    let mut driver = Driver::new(Client::new(client_side), ".".into()).with_progress(false);

    let err = driver.run(&b"LIST\n"[..]).await.unwrap_err();
    assert!(err.is_fatal());
}
