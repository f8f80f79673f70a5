//! Upstream venue connectivity: REST clients and the websocket consumer.

pub mod polymarket;
