//! WebSocket Live Updates
//!
//! Pushes simulated node renames to every connected client.
//!
//! ## Architecture
//!
//! - **UpdateBroadcaster**: owns the subscriber set and the periodic task
//! - **Handler**: handles WebSocket upgrade and per-connection forwarding
//! - **Messages**: the `[{id, newName}]` batch format
//! - **Rename**: the counter-suffix rename rule
//!
//! ## Usage
//!
//! Clients connect to `/ws`; no subscription message is needed.
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8080/ws');
//!
//! ws.onmessage = (event) => {
//!   for (const { id, newName } of JSON.parse(event.data)) {
//!     console.log(`${id} is now ${newName}`);
//!   }
//! };
//! ```

mod broadcaster;
mod handler;
mod messages;
mod rename;

pub use broadcaster::{
    BroadcastError, BroadcasterStats, SubscriberId, SubscriberSender, UpdateBroadcaster,
};
pub use handler::websocket_handler;
pub use messages::{encode_batch, NameUpdate};
pub use rename::{next_name, strip_counter};
