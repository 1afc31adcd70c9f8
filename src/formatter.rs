mod emitter;
mod engine;
mod lexer;

pub use engine::{format_text, Beautifier};
