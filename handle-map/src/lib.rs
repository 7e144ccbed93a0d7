#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Dense slot maps with generation checked 32-bit handles
//!
//! see [`HandleMap`] for the map itself, and `fd` (on by default) for
//! descriptor tables built on top of it
//!
//! ```
//! let mut map = handle_map::HandleMap::new(0, 0);
//! let handle = map.insert(42);
//! assert_eq!(map.remove(handle), Some(42));
//! assert!(!map.is_valid(handle));
//! ```

pub use handle_map_core::{generation, map, Generation, Handle, HandleMap, InvalidHandle, Meta};

#[cfg(feature = "fd")]
#[cfg_attr(docsrs, doc(cfg(feature = "fd")))]
pub use handle_map_fd as fd;
