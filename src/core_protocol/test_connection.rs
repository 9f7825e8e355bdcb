// Line/raw framing exercised over in-memory pipes

use super::*;
use std::time::Duration;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn test_read_line_strips_only_the_newline() {
    let (mut peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    peer.write_all(b"AUTH secret123\r\nLIST\n").await.unwrap();
    assert_eq!(
        conn.read_line().await.unwrap().as_deref(),
        Some("AUTH secret123\r")
    );
    assert_eq!(conn.read_line().await.unwrap().as_deref(), Some("LIST"));
}

#[tokio::test]
async fn test_close_between_lines_is_end_of_stream() {
    let (mut peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    peer.write_all(b"QUIT\n").await.unwrap();
    drop(peer);
    assert_eq!(conn.read_line().await.unwrap().as_deref(), Some("QUIT"));
    assert!(conn.read_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_close_mid_line_is_an_error() {
    let (mut peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    peer.write_all(b"LIS").await.unwrap();
    drop(peer);
    let err = conn.read_line().await.unwrap_err();
    assert!(matches!(err, ProtocolError::TruncatedLine));
    assert!(err.is_disconnect());
}

#[tokio::test]
async fn test_invalid_utf8_is_rejected() {
    let (mut peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    peer.write_all(&[0x41, 0xff, 0xfe, b'\n']).await.unwrap();
    assert!(matches!(
        conn.read_line().await.unwrap_err(),
        ProtocolError::InvalidUtf8
    ));
}

#[tokio::test]
async fn test_overlong_line_is_rejected() {
    let (mut peer, local) = duplex(1024);
    let mut conn = Connection::new(local).with_max_line_length(8);

    peer.write_all(b"12345678\n").await.unwrap();
    assert_eq!(conn.read_line().await.unwrap().as_deref(), Some("12345678"));

    peer.write_all(b"123456789\n").await.unwrap();
    assert!(matches!(
        conn.read_line().await.unwrap_err(),
        ProtocolError::LineTooLong(8)
    ));
}

#[tokio::test]
async fn test_unbounded_line_length_still_reads_lines() {
    let (mut peer, local) = duplex(1024);
    let mut conn = Connection::new(local).with_max_line_length(usize::MAX);

    peer.write_all(b"LIST\n").await.unwrap();
    assert_eq!(conn.read_line().await.unwrap().as_deref(), Some("LIST"));
}

#[tokio::test]
async fn test_write_line_appends_newline_once() {
    let (mut peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    conn.write_line("READY").await.unwrap();
    conn.write_line("BYE\n").await.unwrap();
    drop(conn);

    let mut received = String::new();
    peer.read_to_string(&mut received).await.unwrap();
    assert_eq!(received, "READY\nBYE\n");
}

#[tokio::test]
async fn test_raw_segment_is_not_line_framed() {
    let (mut peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    // Payload contains newlines; the trailing line must survive intact
    peer.write_all(b"a\nb\ncEOF\n").await.unwrap();
    conn.begin_raw(5).unwrap();
    assert_eq!(
        conn.mode(),
        ReadMode::Raw {
            declared: 5,
            remaining: 5
        }
    );

    let mut payload = Vec::new();
    let mut buf = [0u8; 2];
    loop {
        let n = conn.read_raw(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        payload.extend_from_slice(&buf[..n]);
    }
    assert_eq!(payload, b"a\nb\nc");
    assert_eq!(conn.mode(), ReadMode::Line);
    assert_eq!(conn.read_line().await.unwrap().as_deref(), Some("EOF"));
}

#[tokio::test]
async fn test_line_read_during_raw_segment_is_refused() {
    let (_peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    conn.begin_raw(3).unwrap();
    assert!(matches!(
        conn.read_line().await.unwrap_err(),
        ProtocolError::ModeViolation { remaining: 3 }
    ));
    assert!(conn.begin_raw(1).is_err());
}

#[tokio::test]
async fn test_zero_length_segment_stays_in_line_mode() {
    let (_peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    conn.begin_raw(0).unwrap();
    assert_eq!(conn.mode(), ReadMode::Line);
}

#[tokio::test]
async fn test_short_raw_segment_reports_partial_transfer() {
    let (mut peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    peer.write_all(b"hel").await.unwrap();
    drop(peer);

    let mut sink = Vec::new();
    let mut transfer = Transfer::new("hello.txt", 5);
    let err = conn
        .recv_raw_into(&mut sink, &mut transfer, 16, |_| {})
        .await
        .unwrap_err();
    match err {
        ProtocolError::PartialTransfer { expected, received } => {
            assert_eq!(expected, 5);
            assert_eq!(received, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(sink, b"hel");
}

#[tokio::test]
async fn test_send_raw_from_reports_progress() {
    let (mut peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    let mut source: &[u8] = b"0123456789";
    let mut transfer = Transfer::new("digits", 10);
    let mut seen = Vec::new();
    conn.send_raw_from(&mut source, &mut transfer, 4, |t| seen.push(t.transferred()))
        .await
        .unwrap();
    assert_eq!(seen, vec![4, 8, 10]);

    let mut received = [0u8; 10];
    peer.read_exact(&mut received).await.unwrap();
    assert_eq!(&received, b"0123456789");
}

#[tokio::test]
async fn test_send_raw_from_short_source() {
    let (_peer, local) = duplex(1024);
    let mut conn = Connection::new(local);

    let mut source: &[u8] = b"abc";
    let mut transfer = Transfer::new("shrunk", 10);
    let err = conn
        .send_raw_from(&mut source, &mut transfer, 4, |_| {})
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::PartialTransfer {
            expected: 10,
            received: 3
        }
    ));
}

#[tokio::test]
async fn test_idle_read_times_out() {
    let (_peer, local) = duplex(1024);
    let mut conn = Connection::new(local).with_timeout(Some(Duration::from_millis(50)));

    assert!(matches!(
        conn.read_line().await.unwrap_err(),
        ProtocolError::TimedOut(_)
    ));
}
