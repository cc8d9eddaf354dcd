//! The Satchel Library.
//!
//! Types shared between the server and its clients: validated path
//! segments, download references, the rating scale and the API
//! request/response shapes.

#![deny(
    asm_sub_register,
    deprecated,
    missing_abi,
    unsafe_code,
    unused_macros,
    unused_must_use,
    unused_unsafe
)]
#![deny(clippy::from_over_into, clippy::needless_question_mark)]
#![cfg_attr(
    not(debug_assertions),
    deny(unused_imports, unused_mut, unused_variables,)
)]

pub mod api;
pub mod artifact;
pub mod class;
pub mod download;
pub mod error;
pub mod rating;
pub mod student;
#[cfg(feature = "tokio")]
pub mod util;

pub use error::{SatchelError, SatchelResult};
