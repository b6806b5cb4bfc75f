//! Aggregate Event Stream
//!
//! Pushes player-count snapshots to connected clients.
//!
//! ## Architecture
//!
//! - **StreamHub**: Hands out feeds, counts open ones, signals shutdown
//! - **AggregateFeed**: One client's stream; owns a periodic ticker task
//!
//! Every feed yields the current aggregate as soon as it is created, then a
//! fresh one every tick. Dropping the feed (the client went away) aborts the
//! ticker, so no timer outlives its connection.
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const source = new EventSource('/player-count-stream');
//!
//! source.onmessage = (event) => {
//!   const { current, total } = JSON.parse(event.data);
//!   console.log('Players online:', current, total);
//! };
//! ```

mod feed;
mod hub;

pub use feed::{AggregateFeed, ConnectionId};
pub use hub::{StreamConfig, StreamHub};
