//! Signal engines (§4.H, §4.I): turn ingested trades and orderbook state
//! into append-only `SignalEvent` rows.

pub mod arb;
pub mod trades;
