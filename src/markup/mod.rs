//! Markup tree model.
//!
//! This module handles:
//! - Tokenizing HTML-like markup into a tolerant node tree
//! - Decoding character entities
//! - Serializing the tree back to markup text
//!
//! The parser never rejects input. Unbalanced or unknown markup is kept as
//! close to the source as the tree allows.

mod entities;
mod parser;
mod types;

pub use entities::decode_entities;
pub use parser::parse;
pub use types::{Element, Node, is_block_element, is_void_element, serialize};
