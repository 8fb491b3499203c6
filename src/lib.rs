#![allow(clippy::len_without_is_empty)]
#![allow(clippy::new_without_default)]

mod document;
mod error;
mod options;
mod parser;
mod value;


pub use {document::*, error::*, options::*, parser::*, value::*};
