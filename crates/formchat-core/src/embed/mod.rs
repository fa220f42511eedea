//! Embed compilation: from a stored chatbot configuration to the two
//! copy-pasteable snippets an operator places on their page.

pub mod compiler;
pub mod customization;
pub mod escape;

pub use compiler::{EmbedCompiler, compile, frame_url};
