mod r#impl;
mod structs;

pub use r#impl::ServerEnv;
pub use structs::*;
