//! UDP transport for the dispatch engine
//!
//! Owns the single shared socket. Each received datagram is handed to its
//! own tokio task which runs the full pipeline to completion: decode,
//! dispatch, encode, authenticate, transmit. Tasks are fire-and-forget with
//! no upper bound; admission control is a deployment concern, not handled
//! here.

use crate::dispatch::{Dispatcher, Outcome};
use radius_wire::auth::{sign_accounting_request, sign_response};
use radius_wire::{Code, CryptoError, Packet, PacketError};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("packet error: {0}")]
    Packet(#[from] PacketError),
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// RADIUS server: one UDP listener, one secret, one dispatcher
pub struct RadiusServer {
    socket: Arc<UdpSocket>,
    secret: Arc<Vec<u8>>,
    dispatcher: Arc<Dispatcher>,
}

impl RadiusServer {
    /// Bind the listener socket
    ///
    /// The shared secret is per listener; an empty secret is rejected here
    /// rather than failing every digest later.
    pub async fn bind(
        bind_addr: SocketAddr,
        secret: impl Into<Vec<u8>>,
        dispatcher: Dispatcher,
    ) -> Result<Self, ServerError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ServerError::Crypto(CryptoError::EmptySecret));
        }

        let socket = UdpSocket::bind(bind_addr).await?;
        info!("RADIUS engine listening on {}", bind_addr);

        Ok(RadiusServer {
            socket: Arc::new(socket),
            secret: Arc::new(secret),
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Local address of the listener, useful when binding to port 0 in tests
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.socket.local_addr().map_err(ServerError::from)
    }

    /// Receive loop: spawn one task per datagram
    ///
    /// Per-datagram failures never return from here; the only error this
    /// surfaces is a failed socket receive, which is fatal to the listener.
    pub async fn run(&self) -> Result<(), ServerError> {
        let mut buf = vec![0u8; Packet::MAX_PACKET_SIZE];

        loop {
            let (len, addr) = self.socket.recv_from(&mut buf).await?;
            let data = buf[..len].to_vec();

            let socket = Arc::clone(&self.socket);
            let secret = Arc::clone(&self.secret);
            let dispatcher = Arc::clone(&self.dispatcher);

            tokio::spawn(async move {
                Self::handle_datagram(data, addr, secret, dispatcher, socket).await;
            });
        }
    }

    /// Run one datagram through decode, dispatch, and transmit
    ///
    /// All failure modes are silent toward the peer: a NAS retransmits on
    /// timeout, so the protocol-correct answer to anything malformed or
    /// dropped is no answer at all.
    async fn handle_datagram(
        data: Vec<u8>,
        addr: SocketAddr,
        secret: Arc<Vec<u8>>,
        dispatcher: Arc<Dispatcher>,
        socket: Arc<UdpSocket>,
    ) {
        let mut request = match Packet::decode(&data, &secret) {
            Ok(packet) => packet,
            Err(e) => {
                debug!(client_addr = %addr, error = %e, "dropping undecodable datagram");
                return;
            }
        };
        request.peer = Some(addr);

        debug!(
            packet_type = %request.code,
            client_addr = %addr,
            request_id = request.identifier,
            "received RADIUS packet"
        );

        let response = match dispatcher.dispatch(&request) {
            Outcome::Sent(response) => response,
            Outcome::Dropped => return,
        };

        let bytes = match Self::finalize(&response, &secret) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    client_addr = %addr,
                    request_id = request.identifier,
                    error = %e,
                    "failed to encode response"
                );
                return;
            }
        };

        if let Err(e) = socket.send_to(&bytes, addr).await {
            warn!(
                client_addr = %addr,
                request_id = request.identifier,
                error = %e,
                "transmit failed"
            );
            return;
        }

        dispatcher.notify_reply(&request, &response);

        debug!(
            response_type = %response.code,
            client_addr = %addr,
            request_id = response.identifier,
            "sent RADIUS response"
        );
    }

    /// Encode a response and compute its authenticator in place
    ///
    /// Responses carry the response digest computed over the finalized
    /// datagram with the request authenticator still in the header region.
    /// A re-emitted Accounting-Request instead gets its request-style digest
    /// over a zeroed authenticator region.
    fn finalize(response: &Packet, secret: &[u8]) -> Result<Vec<u8>, ServerError> {
        let mut bytes = response.encode(secret)?;
        match response.code {
            Code::AccountingRequest => sign_accounting_request(&mut bytes, secret)?,
            _ => sign_response(&mut bytes, secret)?,
        };
        Ok(bytes)
    }
}
