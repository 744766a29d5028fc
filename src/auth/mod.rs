//! Authentication: bearer-token context, its on-disk store, and the
//! identity providers that produce sign-in credentials.

pub mod context;
pub mod provider;
pub mod store;
