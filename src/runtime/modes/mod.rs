pub mod server;

pub use server::{build_app, run_server};
