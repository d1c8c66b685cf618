mod initialize;
pub use initialize::{Initializer, Portal};

mod config;
pub use config::{Backend, Config, StorageConfig};

pub mod filepath {
    pub const COLLECTIONS: &str = "collections";
    pub const BLOBS: &str = "blobs";
}

pub mod env {
    pub const LOG_DIRECTIVE: &str = "CLEANPORTAL_LOG";
}
