use shadow_rs::shadow;

shadow!(build);

// Search space
// ------------
pub mod grid;
pub mod map;

// Search
// ------
pub mod expander;
pub mod frontier;
pub mod node;
pub mod path;
pub mod search;

// Output
// ------
pub mod renderer;
