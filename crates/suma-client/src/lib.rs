//! # suma-client - The Kit
//!
//! Client for the systems-management server's remote API.
//!
//! The server exposes one logical method set over two wire bindings. Both are
//! [`Transport`]s; [`RemoteApiClient`] puts typed methods on top of either.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use suma_client::{HttpSettings, JsonRpcTransport, RemoteApiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), suma_client::Error> {
//!     let transport = JsonRpcTransport::with_settings(
//!         "https://suma.example.com/rpc/api",
//!         &HttpSettings::default(),
//!     )?;
//!     let api = RemoteApiClient::new(transport);
//!
//!     let session = api.login("admin", "secret").await?;
//!     for system in api.list_systems(&session).await? {
//!         let packages = api.list_packages(&session, system.id).await?;
//!         println!("{}: {} packages", system.hostname, packages.len());
//!     }
//!     api.logout(session).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Bindings
//!
//! ```text
//! ┌──────────────────────┐                         ┌──────────────────────┐
//! │  RemoteApiClient<T>  │  POST {methodName, ...} │  Management server   │
//! │                      │ ──── JsonRpcTransport ─►│                      │
//! │  login / logout      │                         │  auth.*              │
//! │  list_systems        │  POST <methodCall>      │  system.*            │
//! │  relevant_errata     │ ──── XmlRpcTransport ──►│                      │
//! │  list_packages       │                         │                      │
//! └──────────────────────┘                         └──────────────────────┘
//! ```

mod api;
mod error;
mod json;
mod transport;
pub mod xmlrpc;

pub use api::{RemoteApiClient, SECURITY_ADVISORY, Session};
pub use error::Error;
pub use json::JsonRpcTransport;
pub use transport::{AnyTransport, HttpSettings, Transport, TransportKind};
pub use xmlrpc::XmlRpcTransport;

pub use suma_core::{SystemId, SystemRecord};
