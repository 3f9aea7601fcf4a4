#![doc = include_str!("../README.md")]

mod error;
mod order;
mod page;
mod query;

pub use crate::error::*;
pub use crate::order::*;
pub use crate::page::*;
pub use crate::query::*;
