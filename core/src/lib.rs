#![no_std]
#![forbid(missing_docs, unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A dense slot map that hands out packed, generation checked 32-bit
//! [`Handle`]s.
//!
//! Values live in a hole-free `Vec<_>`, so iterating over them is as fast as
//! iterating over a slice. Handles point into a separate array of slots,
//! which gives the map the freedom to move values around (on removal, and
//! during [`defragment`](HandleMap::defragment)) without invalidating any
//! handle. Each slot has a [`Generation`] that is advanced when it's value
//! is removed, so using a handle after it's value was removed is detected
//! instead of silently reading whatever took its place.
//!
//! ```
//! use handle_map_core::HandleMap;
//!
//! let mut map = HandleMap::new(0, 4);
//! let a = map.insert("a");
//! let b = map.insert("b");
//!
//! assert_eq!(map.erase(a), 1);
//! assert!(!map.is_valid(a));
//! assert_eq!(map[b], "b");
//! ```
//!
//! # Features
//!
//! `serde` - `Serialize`/`Deserialize` for [`Handle`] and [`Generation`]
//!
//! `unchecked` - in release builds, [`HandleMap::at`] (and `Index`) only
//! bounds check, and skip the `type_id` and generation checks. A stale handle
//! may then return an unrelated value instead of panicking.

#[doc(hidden)]
pub extern crate alloc as std;

mod error;
pub mod generation;
mod handle;
pub mod map;

pub use error::InvalidHandle;
pub use generation::Generation;
pub use handle::Handle;
pub use map::{HandleMap, Meta};
