pub mod service;

pub use service::configure;
