mod deployment;
mod scope;

pub use deployment::*;
pub use scope::*;
