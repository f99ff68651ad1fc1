//! A PCFG-driven generator for brick placement programs: a small
//! placement-machine language interpreted over a voxel world, and a
//! probabilistic context-free grammar that walks derivations guided by a
//! spatial fitness function.

pub mod error;
pub mod fitness;
pub mod generator;
pub mod grammar;
pub mod interpreter;
pub mod ldraw;
pub mod lexer;
pub mod parse_cache;
pub mod state;
pub mod vector;
pub mod voxel;

pub use error::{BrickError, BrickResult};
pub use generator::{generate, GenerationLimits};
pub use grammar::{load_grammar, Grammar};
pub use interpreter::Element;
