pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod storage;

pub use config::{AppConfig, CONFIG_FILE_NAME};
pub use core::{ResourceMapping, SyncEngine, SyncItem, SyncReport};
pub use error::{Result, SyncError};
pub use storage::{Credentials, RemoteConnector, RemoteTree, WebDavConnector};
