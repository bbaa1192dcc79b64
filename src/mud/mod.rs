//! Core MUD engine: sessions, verbs, the command catalog and the TCP
//! server that ties them to connected players.

pub mod commands;
pub mod server;
pub mod session;
pub mod verb;

pub use commands::{CommandProcessor, MudCommand};
pub use server::MudServer;
pub use session::{MudResponse, Session, SessionRegistry};
pub use verb::Verb;
