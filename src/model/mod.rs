//! Pure data structures for the course tree: identifiers, the four node types,
//! and the edit payload merged into them.

pub mod course;
pub mod ids;

pub use course::*;
pub use ids::*;
