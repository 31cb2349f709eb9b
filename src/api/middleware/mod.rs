//! Request extractors

mod session;

pub use session::RequireOwner;
