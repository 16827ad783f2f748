pub mod crawler;
pub mod engine;
pub mod model;
pub mod reconciler;
pub mod scanner;
pub mod transfer;

pub use crawler::crawl;
pub use engine::{SyncEngine, SyncReport};
pub use model::{LocalFileDescriptor, RemoteFileDescriptor, ResourceMapping, SyncItem};
pub use reconciler::reconcile;
pub use scanner::scan;
pub use transfer::fetch;
