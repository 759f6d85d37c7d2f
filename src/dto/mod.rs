pub mod account;
pub mod career;
pub mod common;
pub mod learning;
pub mod roadmap;

// Re-export commonly used types for convenience
pub use account::*;
pub use career::*;
pub use common::*;
pub use learning::*;
pub use roadmap::*;
