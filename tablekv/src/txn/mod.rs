pub mod context;
pub mod engine;

pub use context::{ReadContext, WriteContext};
pub use engine::Engine;
