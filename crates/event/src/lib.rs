//! Typed, single-threaded event emitter
//! ## Example
//! ```
//! use std::{cell::RefCell, rc::Rc};
//!
//! use event_rs::Emitter;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let emitter: Emitter<u32> = Emitter::new();
//!
//! let sub = {
//!     let seen = seen.clone();
//!     emitter.on(move |n| seen.borrow_mut().push(*n))
//! };
//! emitter.once(|n| assert_eq!(*n, 1));
//!
//! emitter.emit(&1);
//! sub.unsubscribe();
//! emitter.emit(&2);
//!
//! assert_eq!(*seen.borrow(), vec![1]);
//! assert!(emitter.is_empty());
//! ```

mod dispatch;
mod emitter;
mod guard;
mod registry;
mod subscription;

// Reexport of the public API.
#[doc(inline)]
pub use crate::emitter::*;
#[doc(inline)]
pub use crate::guard::*;
#[doc(inline)]
pub use crate::registry::ListenerHandle;
#[doc(inline)]
pub use crate::subscription::*;
