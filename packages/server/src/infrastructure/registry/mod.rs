//! Connection registry: the live set of client connections and broadcast fan-out.

mod connection;
mod sink;

pub use connection::{BroadcastReport, ConnectionRegistry, DEFAULT_DELIVERY_TIMEOUT};
pub use sink::{ChannelSink, ConnectionSink, DeliveryError};
