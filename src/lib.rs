pub mod citation;
pub mod error;
pub mod navigate;
pub mod options;
pub mod reference;
pub mod render;
pub mod section;
pub mod syntax;
pub mod tree;

#[cfg(feature = "pulldown")]
pub mod adapters;

pub use citation::*;
pub use error::*;
pub use navigate::*;
pub use options::*;
pub use reference::*;
pub use render::*;
pub use section::*;
pub use syntax::*;
pub use tree::*;
