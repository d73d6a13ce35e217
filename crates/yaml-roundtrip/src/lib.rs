#![doc = include_str!("../README.md")]
#![allow(unused_assignments)] // thiserror/miette derive macros trigger false positives

extern crate alloc;

mod compose;
mod document;
mod error;
mod node;
mod options;
mod stringify;
mod validate;

pub mod cst;
pub mod scalar;

pub use crate::document::{Document, parse, parse_all_documents, parse_with_options};
pub use crate::error::{ErrorCode, NodeError, YamlError};
pub use crate::node::{Item, Map, Node, NodeMeta, Pair, Scalar, Seq};
pub use crate::options::{ParseOptions, ToStringOptions};
pub use crate::scalar::{Chomping, ScalarStyle};
