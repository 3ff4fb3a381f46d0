//! RADIUS Wire Protocol
//!
//! Codec for RADIUS packets as defined in RFC 2865 and RFC 2866: binary
//! encode/decode of the fixed header and the ordered attribute stream,
//! vendor-specific attribute (VSA) nesting, User-Password obfuscation, and
//! the request/response authenticator computations.
//!
//! The crate is purely synchronous and performs no I/O; transports hand it
//! raw datagrams and take back encoded byte buffers.
//!
//! # Example
//!
//! ```rust
//! use radius_wire::{Packet, Code, AttributeType};
//! use radius_wire::auth::generate_request_authenticator;
//!
//! let req_auth = generate_request_authenticator();
//! let mut packet = Packet::new(Code::AccessRequest, 1, req_auth);
//! packet.add_attribute_by_name("User-Name", b"alice".to_vec()).unwrap();
//! packet.add_attribute_by_name("User-Password", b"password".to_vec()).unwrap();
//!
//! // User-Password is obfuscated with the shared secret during encode.
//! let bytes = packet.encode(b"secret").unwrap();
//! let decoded = Packet::decode(&bytes, b"secret").unwrap();
//! assert_eq!(decoded.first_attribute_string("User-Password", None).unwrap(), "password");
//! ```

pub mod attributes;
pub mod auth;
pub mod packet;
pub mod vendor;

pub use attributes::{AcctStatusType, Attribute, AttributeType, Vsa};
pub use auth::{
    decrypt_password, encrypt_password, generate_request_authenticator, sign_accounting_request,
    sign_response, verify_response, CryptoError,
};
pub use packet::{Code, Packet, PacketError};
pub use vendor::{DictionaryError, VendorDictionary};
