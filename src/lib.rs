#![doc = include_str!("../README.md")]

mod error;

pub mod bitbuffer;
pub mod bits;
pub mod decoder;
pub mod devices;
pub mod integrity;
pub mod record;
pub mod registry;

pub use error::{Error, Result};
