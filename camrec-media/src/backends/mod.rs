//! Host backends
//!
//! `mock` is always available; `web` is compiled for `wasm32` only.

pub mod mock;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use mock::{
    MockDocument, MockHost, MockPermission, MockRecorder, MockStream, RenderedNode,
    RenderedSource,
};
#[cfg(target_arch = "wasm32")]
pub use web::{WebDocument, WebHost, WebRecorder, WebStream};
