//! RADIUS Server Engine
//!
//! Request-dispatch pipeline on top of the [`radius_wire`] codec: incoming
//! datagrams are routed by packet code to an ordered chain of policy steps
//! (middleware), each of which can continue, short-circuit accept, or drop
//! the exchange. The transport owns a single UDP socket and spawns one task
//! per datagram.
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_engine::{Dispatcher, Flow, RadiusServer};
//! use radius_wire::Code;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut dispatcher = Dispatcher::new();
//!     dispatcher.route(Code::AccessRequest, |req: &radius_wire::Packet, res: &mut radius_wire::Packet| {
//!         let ok = req.first_attribute_string("User-Name", None).as_deref() == Some("alice");
//!         res.code = if ok { Code::AccessAccept } else { Code::AccessReject };
//!         Flow::Continue
//!     });
//!
//!     let server = RadiusServer::bind("0.0.0.0:1812".parse()?, "secret", dispatcher).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod server;
pub mod session;

pub use config::{Config, ConfigError, User};
pub use dispatch::{Dispatcher, Flow, Outcome, PolicyStep};
pub use server::{RadiusServer, ServerError};
pub use session::{Session, SessionSet};
