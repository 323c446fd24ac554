//! Auth-domain types: scope sets, access tokens, and signed client assertions.

pub mod assertion;
pub mod scope;
pub mod token;

pub use assertion::*;
pub use scope::*;
pub use token::*;
