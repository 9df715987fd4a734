pub mod display;
pub mod node;

pub use display::*;
pub use node::*;
