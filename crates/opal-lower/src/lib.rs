// opal-lower: lowering passes for the Opal frontend
//
// Architecture:
// - passes: focused tree-rewriting passes run between parsing/name-binding
//   and type-checking; each takes the root node by mutable reference and
//   reports user-level misuse through the diagnostic sink

pub mod error;
pub mod passes;

// Re-export key types for convenience
pub use passes::*;
