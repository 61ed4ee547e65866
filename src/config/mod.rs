mod duration;

pub use duration::{deserialize_opt as deserialize_opt_duration, parse_duration};
