pub mod deployment_watcher;

pub use deployment_watcher::{DeploymentWatcher, StatusLookup, WatchError};
