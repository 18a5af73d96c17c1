//! The base module contains the core support functionality of the `CommandScript` frontend.

pub mod source_file;

mod error;
#[doc(inline)]
pub use error::{Error, Result, SyntaxError};

pub mod log;
