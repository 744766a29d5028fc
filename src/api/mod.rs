//! Practice API: REST client, wire records, and the task dispatcher that
//! keeps network calls off the event loop.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod model;
