//! Command handlers.
//!
//! - `generate`: run the quota driver for one entity profile
//! - `seed`: push stored records into the profile's endpoint
//! - `status`: compare stored records against the target

pub mod generate;
pub mod seed;
pub mod status;

pub use generate::run as generate;
pub use seed::run as seed;
pub use status::run as status;
