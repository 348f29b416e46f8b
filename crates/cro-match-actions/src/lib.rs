//! Custom-action adapter between an external dialogue engine and the CRO matching core.
//!
//! The dialogue engine owns turn order, the slot store and NLU. For each action it
//! sends a JSON request; [`server::ActionServer`] answers with slot events and
//! messages produced by `cro_match_core`.

pub mod config;
pub mod logging;
pub mod protocol;
pub mod server;

pub use config::{AppConfig, ConfigError, ConfigResult};
pub use protocol::{parse_request, ActionRequest, ActionResponse, ProtocolError, WireEvent};
pub use server::{ActionKind, ActionServer};
