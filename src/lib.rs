mod catalog;
mod client_node;
pub mod codec;
mod config;
mod coordinator;
pub mod domain;
mod host_node;
mod logging;
mod preview;
mod replicator;
pub mod transport;

pub use catalog::*;
pub use client_node::*;
pub use config::*;
pub use coordinator::*;
pub use domain::*;
pub use host_node::*;
pub use logging::init_logging;
pub use preview::*;
pub use replicator::*;
pub use transport::in_memory::{LoopbackClient, LoopbackHost, LoopbackNet};
pub use transport::{Channel, ClientTransport, HostTransport, Packet};
