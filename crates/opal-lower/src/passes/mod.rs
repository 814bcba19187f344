// Passes - focused lowering passes that rewrite one surface form each

pub mod try_lowering;

pub use try_lowering::*;
