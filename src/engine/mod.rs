//! Orchestration of store, cache, codec, transform and change bus
//!
//! [`Stowage`] is the public face of the crate. It composes:
//!
//! - a [`DurableStore`](crate::DurableStore), the source of truth
//! - a [`ReadCache`](crate::ReadCache) of decoded values
//! - a [`Codec`](crate::Codec) and a [`Transform`](crate::Transform) between
//!   values and stored payloads
//! - a [`ChangeBus`](crate::ChangeBus) announcing every completed put and
//!   delete
//!
//! Operations on the same key are serialized internally. Operations on
//! different keys dispatched concurrently complete in no particular order.

mod builder;
mod errors;
mod locks;
mod lookup;
mod stowage;
mod streams;

pub use builder::StowageBuilder;
pub use errors::{StowageError, StowageResult};
pub use lookup::Lookup;
pub use stowage::{StoredValue, Stowage};
