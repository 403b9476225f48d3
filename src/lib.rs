//! Declarative `Cache-Control` headers for Iron handlers.
//!
//! Describe the directives a handler wants with `CacheControlOptions`
//! and build its entry point with `build_entry_point` (or implement
//! `CacheControlled` on the handler type). Handlers with nothing
//! configured are served unwrapped; the rest get an after-middleware
//! that patches each response's `Cache-Control` header.

#[macro_use]
extern crate log;
extern crate iron;
extern crate rustc_serialize;

mod options;
mod cache;
mod entry_point;
mod view;

pub use options::{CacheControlOptions, Directive, DirectiveValue, Iter, ResolvedOptions};
pub use entry_point::{build_entry_point, try_build_entry_point, ApplyCacheControl, EntryPoint};
pub use view::CacheControlled;
