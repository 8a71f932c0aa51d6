pub mod project;
pub mod replay;
pub mod resolve;
pub mod symbols;
pub mod util;

pub use project::*;
pub use replay::*;
pub use resolve::*;
pub use symbols::*;
pub use util::*;
