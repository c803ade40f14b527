pub mod ast;
pub mod binder;
pub mod error;
pub mod lexer;
pub mod raw;

// Re-exports for clean API
pub use ast::{Node, Operator};
pub use binder::Binder;
pub use error::QueryParseError;
pub use lexer::{tokenize, Lexeme, Token};
pub use raw::RawParser;
