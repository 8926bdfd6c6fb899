#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! End-to-end tests for the UDP listener supervisor: datagram framing,
//! per-sender addressing, malformed-input handling, and the stop contract.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::timeout;

use netframe::listener::udp;
use netframe::{client, ListenerConfig, ListenerState, PeerHandle, Request, TransportError};

const WAIT: Duration = Duration::from_secs(2);

fn loopback_config() -> ListenerConfig {
    ListenerConfig::new(0).with_ip(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[tokio::test]
async fn datagrams_from_two_clients_carry_their_addresses() {
    let (mut requests, mut handle) = udp::start(loopback_config()).await.unwrap();
    let addr = handle.local_addr();

    let alice = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let bob = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    alice
        .send_to(&Request::new(1, b"from-alice".to_vec()).to_bytes(), addr)
        .await
        .unwrap();
    bob.send_to(&Request::new(2, b"from-bob".to_vec()).to_bytes(), addr)
        .await
        .unwrap();

    // Arrival order across senders is not guaranteed; match by kind.
    for _ in 0..2 {
        let event = timeout(WAIT, requests.recv()).await.unwrap().unwrap();
        let (expected_addr, expected_payload) = match event.request.kind {
            1 => (alice.local_addr().unwrap(), b"from-alice".as_slice()),
            2 => (bob.local_addr().unwrap(), b"from-bob".as_slice()),
            other => panic!("unexpected kind {other}"),
        };
        assert_eq!(event.request.payload, expected_payload);
        match event.peer {
            PeerHandle::Datagram(peer) => assert_eq!(peer, expected_addr),
            PeerHandle::Stream(_) => panic!("expected a datagram peer"),
        }
    }

    handle.stop();
}

#[tokio::test]
async fn malformed_datagrams_are_dropped_and_the_loop_continues() {
    let (faults, mut fault_rx) = mpsc::channel(16);
    let (mut requests, mut handle) = udp::start_with_observer(loopback_config(), Some(faults))
        .await
        .unwrap();
    let addr = handle.local_addr();

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    // Shorter than the frame header.
    sender.send_to(&[0xAB, 0xCD], addr).await.unwrap();
    let fault = timeout(WAIT, fault_rx.recv()).await.unwrap().unwrap();
    assert!(matches!(
        fault.error,
        TransportError::TruncatedHeader {
            actual: 2,
            ..
        }
    ));
    assert_eq!(fault.peer, sender.local_addr().unwrap());

    // Header declares more payload than the datagram carries.
    let mut truncated = Request::new(3, vec![0u8; 10]).to_bytes();
    truncated.truncate(truncated.len() - 6);
    sender.send_to(&truncated, addr).await.unwrap();
    let fault = timeout(WAIT, fault_rx.recv()).await.unwrap().unwrap();
    assert!(matches!(
        fault.error,
        TransportError::TruncatedPayload {
            declared: 10,
            actual: 4
        }
    ));

    // The receive loop survives both: a good frame still gets through.
    sender
        .send_to(&Request::empty(4).to_bytes(), addr)
        .await
        .unwrap();
    let event = timeout(WAIT, requests.recv()).await.unwrap().unwrap();
    assert_eq!(event.request.kind, 4);
    assert!(event.request.payload.is_empty());
    assert!(requests.try_recv().is_err(), "bad datagrams became events");

    handle.stop();
}

#[tokio::test]
async fn send_udp_helper_pairs_with_the_listener() {
    let (mut requests, mut handle) = udp::start(loopback_config()).await.unwrap();

    client::send_udp(handle.local_addr(), &Request::new(5, b"hello".to_vec()))
        .await
        .unwrap();

    let event = timeout(WAIT, requests.recv()).await.unwrap().unwrap();
    assert_eq!(event.request.kind, 5);
    assert_eq!(event.request.payload, b"hello");
    assert!(matches!(event.peer, PeerHandle::Datagram(_)));

    handle.stop();
}

#[tokio::test]
async fn stop_is_idempotent_and_releases_the_port() {
    let (requests, mut handle) = udp::start(loopback_config()).await.unwrap();
    let addr = handle.local_addr();
    assert_eq!(handle.state(), ListenerState::Running);

    handle.stop();
    handle.stop();
    assert_eq!(handle.state(), ListenerState::Stopped);
    handle.join().await;
    drop(requests);

    // The socket is closed: the same port binds again immediately.
    let rebound = UdpSocket::bind(addr).await;
    assert!(rebound.is_ok(), "port still held after stop: {rebound:?}");
}

#[tokio::test]
async fn bind_conflict_fails_fast() {
    let (_requests, handle) = udp::start(loopback_config()).await.unwrap();

    let occupied = ListenerConfig::new(handle.local_addr().port())
        .with_ip(IpAddr::V4(Ipv4Addr::LOCALHOST));
    match udp::start(occupied).await {
        Err(TransportError::Bind { addr, .. }) => {
            assert_eq!(addr.port(), handle.local_addr().port());
        }
        Ok(_) => panic!("expected a bind error"),
        Err(other) => panic!("expected a bind error, got {other}"),
    }
}
