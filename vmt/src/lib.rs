pub mod codegen;
pub mod driver;
pub mod error;
pub mod label;
pub mod parser;

pub use codegen::CodeGen;
pub use driver::Translator;
pub use error::{Diag, Error};
