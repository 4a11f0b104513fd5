pub mod builder;
pub mod cli;
pub mod response;
pub mod store;
