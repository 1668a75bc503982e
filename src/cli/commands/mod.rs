//! CLI command implementations

pub mod clear;
pub mod config;
pub mod ensure;
pub mod seal;
pub mod status;

pub use clear::execute as clear;
pub use config::execute as config;
pub use ensure::execute as ensure;
pub use seal::execute as seal;
pub use status::execute as status;
