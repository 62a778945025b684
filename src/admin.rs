//! Admin dashboard routing
//!
//! The dashboard route table, router setup and sidebar links.

pub use waymark_admin::*;
