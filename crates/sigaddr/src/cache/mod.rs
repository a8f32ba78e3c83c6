//! The two caching tiers behind offset resolution.
//!
//! [`CachedElement`] is persisted with each pattern definition and gated on
//! the target module's build version. [`ProcessAddressCache`] holds fully
//! resolved offsets in memory until the resolver is reset.

mod element;
mod process;

pub use element::CachedElement;
pub use process::ProcessAddressCache;
