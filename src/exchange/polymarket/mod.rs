//! Polymarket-specific REST and websocket clients.

pub mod messages;
pub mod rest;
pub mod websocket;

pub use messages::{SubscribeMessage, WsMessage};
pub use rest::PolymarketRestClient;
pub use websocket::{ConsumerState, WebsocketConsumer};
