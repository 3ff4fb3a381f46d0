//! End-to-end tests for the RADIUS engine
//!
//! Each test binds a real server on 127.0.0.1:0 and talks to it over UDP:
//! PAP authentication, middleware short-circuit semantics, silent drops, and
//! accounting session tracking.

use radius_engine::{Dispatcher, Flow, RadiusServer, Session, SessionSet};
use radius_wire::auth::{generate_request_authenticator, verify_response};
use radius_wire::{AcctStatusType, Attribute, AttributeType, Code, Packet};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

const SECRET: &[u8] = b"testing123";

/// Bind a server with the given dispatcher and run it in the background
async fn start_server(dispatcher: Dispatcher) -> SocketAddr {
    let server = RadiusServer::bind("127.0.0.1:0".parse().unwrap(), SECRET, dispatcher)
        .await
        .expect("failed to bind server");
    let addr = server.local_addr().expect("failed to get server address");
    tokio::spawn(async move {
        server.run().await.expect("server failed");
    });
    addr
}

/// PAP policy chain over a fixed user table
fn pap_dispatcher(users: &[(&str, &str)]) -> Dispatcher {
    let users: Arc<HashMap<String, String>> = Arc::new(
        users
            .iter()
            .map(|(u, p)| (u.to_string(), p.to_string()))
            .collect(),
    );

    let mut dispatcher = Dispatcher::new();
    dispatcher.route(Code::AccessRequest, move |req: &Packet, res: &mut Packet| {
        let username = req.first_attribute_string("User-Name", None);
        let password = req.first_attribute_string("User-Password", None);
        let ok = match (&username, &password) {
            (Some(u), Some(p)) => users.get(u).map(|stored| stored == p).unwrap_or(false),
            _ => false,
        };
        if ok {
            res.code = Code::AccessAccept;
        } else {
            res.code = Code::AccessReject;
            res.add_attribute_by_name("Reply-Message", b"Authentication failed".to_vec())
                .ok();
        }
        Flow::Continue
    });
    dispatcher
}

fn access_request(username: &str, password: &str, identifier: u8) -> Packet {
    let mut packet = Packet::new(
        Code::AccessRequest,
        identifier,
        generate_request_authenticator(),
    );
    packet
        .add_attribute_by_name("User-Name", username.as_bytes().to_vec())
        .unwrap();
    packet
        .add_attribute_by_name("User-Password", password.as_bytes().to_vec())
        .unwrap();
    packet
}

/// Send a request datagram and wait for the raw response bytes
async fn exchange(packet: &Packet, server_addr: SocketAddr) -> Vec<u8> {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let bytes = packet.encode(SECRET).unwrap();
    socket.send_to(&bytes, server_addr).await.unwrap();

    let mut buf = [0u8; 4096];
    let (len, _) = timeout(Duration::from_secs(5), socket.recv_from(&mut buf))
        .await
        .expect("timed out waiting for response")
        .unwrap();
    buf[..len].to_vec()
}

/// Send a request and assert that nothing comes back within the window
async fn expect_silence(packet: &Packet, server_addr: SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let bytes = packet.encode(SECRET).unwrap();
    socket.send_to(&bytes, server_addr).await.unwrap();

    let mut buf = [0u8; 4096];
    let result = timeout(Duration::from_millis(500), socket.recv_from(&mut buf)).await;
    assert!(result.is_err(), "expected no response, got one");
}

#[tokio::test]
async fn test_pap_authentication_accept() {
    let addr = start_server(pap_dispatcher(&[("alice", "wonderland")])).await;

    let request = access_request("alice", "wonderland", 1);
    let raw = exchange(&request, addr).await;

    let response = Packet::decode(&raw, SECRET).unwrap();
    assert_eq!(response.code, Code::AccessAccept);
    assert_eq!(response.identifier, 1);
    assert!(verify_response(&raw, SECRET, &request.authenticator).unwrap());
}

#[tokio::test]
async fn test_pap_authentication_reject() {
    let addr = start_server(pap_dispatcher(&[("alice", "wonderland")])).await;

    let raw = exchange(&access_request("alice", "wrong", 2), addr).await;
    let response = Packet::decode(&raw, SECRET).unwrap();

    assert_eq!(response.code, Code::AccessReject);
    assert_eq!(
        response.first_attribute_string("Reply-Message", None).as_deref(),
        Some("Authentication failed")
    );
}

#[tokio::test]
async fn test_policy_drop_transmits_nothing() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .route(Code::AccessRequest, |_: &Packet, _: &mut Packet| Flow::Continue)
        .route(Code::AccessRequest, |_: &Packet, _: &mut Packet| Flow::Drop);
    let addr = start_server(dispatcher).await;

    expect_silence(&access_request("alice", "wonderland", 3), addr).await;
}

#[tokio::test]
async fn test_unrouted_code_is_silently_dropped() {
    let addr = start_server(pap_dispatcher(&[("alice", "wonderland")])).await;

    let status_client = Packet::new(Code::StatusClient, 9, [0u8; 16]);
    expect_silence(&status_client, addr).await;

    // the listener survives the drop and keeps answering routed traffic
    let raw = exchange(&access_request("alice", "wonderland", 10), addr).await;
    assert_eq!(Packet::decode(&raw, SECRET).unwrap().code, Code::AccessAccept);
}

#[tokio::test]
async fn test_malformed_datagram_is_ignored() {
    let addr = start_server(pap_dispatcher(&[("alice", "wonderland")])).await;

    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.send_to(&[1, 2, 3], addr).await.unwrap();

    let mut buf = [0u8; 64];
    let result = timeout(Duration::from_millis(500), socket.recv_from(&mut buf)).await;
    assert!(result.is_err(), "malformed datagram must be dropped silently");

    let raw = exchange(&access_request("alice", "wonderland", 11), addr).await;
    assert_eq!(Packet::decode(&raw, SECRET).unwrap().code, Code::AccessAccept);
}

#[tokio::test]
async fn test_short_circuit_accept_skips_rest_of_chain() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .route(Code::AccessRequest, |_: &Packet, res: &mut Packet| {
            res.code = Code::AccessChallenge;
            res.add_attribute_by_name("Reply-Message", b"challenge".to_vec()).ok();
            Flow::Accept
        })
        .route(Code::AccessRequest, |_: &Packet, _: &mut Packet| Flow::Drop);
    let addr = start_server(dispatcher).await;

    let raw = exchange(&access_request("alice", "wonderland", 4), addr).await;
    let response = Packet::decode(&raw, SECRET).unwrap();

    assert_eq!(response.code, Code::AccessChallenge);
    assert_eq!(
        response.first_attribute_string("Reply-Message", None).as_deref(),
        Some("challenge")
    );
}

#[tokio::test]
async fn test_accounting_session_lifecycle() {
    let sessions = Arc::new(SessionSet::new());
    let chain_sessions = Arc::clone(&sessions);

    let mut dispatcher = Dispatcher::new();
    dispatcher.route(
        Code::AccountingRequest,
        move |req: &Packet, res: &mut Packet| {
            res.code = Code::AccountingResponse;
            let status = req
                .find_attribute(AttributeType::AcctStatusType.as_u8())
                .and_then(|attr| attr.as_integer().ok())
                .and_then(AcctStatusType::from_u32);
            let session_id = req.first_attribute_string("Acct-Session-Id", None);
            match (status, session_id) {
                (Some(AcctStatusType::Start), Some(id)) => {
                    let session =
                        Session::new(req.first_attribute_string("User-Name", None), None);
                    chain_sessions.start(id, session);
                }
                (Some(AcctStatusType::Stop), Some(id)) => {
                    chain_sessions.stop(&id);
                }
                _ => {}
            }
            Flow::Continue
        },
    );
    let addr = start_server(dispatcher).await;

    let mut start = Packet::new(Code::AccountingRequest, 20, [0u8; 16]);
    start
        .add_attribute(Attribute::integer(
            AttributeType::AcctStatusType.as_u8(),
            AcctStatusType::Start.as_u32(),
        ).unwrap());
    start
        .add_attribute_by_name("Acct-Session-Id", b"sess-42".to_vec())
        .unwrap();
    start
        .add_attribute_by_name("User-Name", b"alice".to_vec())
        .unwrap();

    let raw = exchange(&start, addr).await;
    assert_eq!(
        Packet::decode(&raw, SECRET).unwrap().code,
        Code::AccountingResponse
    );
    assert!(sessions.contains("sess-42"));

    let mut stop = Packet::new(Code::AccountingRequest, 21, [0u8; 16]);
    stop.add_attribute(Attribute::integer(
        AttributeType::AcctStatusType.as_u8(),
        AcctStatusType::Stop.as_u32(),
    ).unwrap());
    stop.add_attribute_by_name("Acct-Session-Id", b"sess-42".to_vec())
        .unwrap();

    let raw = exchange(&stop, addr).await;
    assert_eq!(
        Packet::decode(&raw, SECRET).unwrap().code,
        Code::AccountingResponse
    );
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_response_authenticator_covers_attributes() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.route(Code::AccessRequest, |_: &Packet, res: &mut Packet| {
        res.code = Code::AccessAccept;
        res.add_attribute_by_name("Reply-Message", b"OK".to_vec()).ok();
        Flow::Continue
    });
    let addr = start_server(dispatcher).await;

    let request = access_request("alice", "wonderland", 5);
    let raw = exchange(&request, addr).await;

    // digest must equal MD5(code+id+len+request-auth+attrs+secret)
    let mut digest_input = raw.clone();
    digest_input[4..20].copy_from_slice(&request.authenticator);
    digest_input.extend_from_slice(SECRET);
    assert_eq!(&raw[4..20], &md5::compute(&digest_input).0);
}
