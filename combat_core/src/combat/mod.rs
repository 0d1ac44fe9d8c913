//! Skill casting

mod cast;

pub use cast::ActiveCast;
