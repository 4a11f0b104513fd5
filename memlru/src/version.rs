pub const MEMLRU_VERSION: &str = env!("CARGO_PKG_VERSION");
