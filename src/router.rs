//! Router core
//!
//! Route registration and matching, location resolution with redirects,
//! the navigation guard pipeline, and history synchronization.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use waymark::router::{MemoryHistory, RouteDescriptor, RouteTable, Router};
//!
//! let table = RouteTable::from_descriptors([
//!     RouteDescriptor::new("/billing").with_name("Billing").with_view("billing"),
//! ])?;
//! let history = Rc::new(MemoryHistory::new("/billing"));
//! let router = Router::new(table, history);
//! router.start().await?;
//! ```

pub use waymark_router::*;
