//! cs-core: Core library for the cloudstash bucket tooling
//!
//! This crate provides the core functionality for cstash, including:
//! - Configuration and storage profile management
//! - Path parsing and resolution
//! - ObjectStore trait the provider adapters implement
//! - Key mapping, bucket synchronization and the bucket lifecycle
//!
//! This crate is independent of any cloud SDK. Stores are passed in
//! explicitly, so everything here can be exercised against mocks.

pub mod compute;
pub mod config;
pub mod error;
pub mod keymap;
pub mod lifecycle;
pub mod object_ops;
pub mod path;
pub mod profile;
pub mod report;
pub mod sync;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use compute::{InstanceInfo, InstanceService, start_stopped};
pub use config::{Config, ConfigManager};
pub use error::{Error, Result};
pub use keymap::{KeyMapper, ObjectKey, SourceItem};
pub use lifecycle::{
    BucketLifecycle, Confirm, ConfirmAction, ConfirmRequest, DeleteOutcome, EmptyOutcome,
};
pub use path::{ParsedPath, RemotePath, parse_path};
pub use profile::{Profile, ProfileManager, Provider};
pub use report::{BatchReport, DeleteReport, ItemFailure, SyncReport};
pub use sync::{BucketSync, SyncOptions, SyncResult, SyncSource, TransferOutcome, TransferTask};
pub use traits::{ContainerInfo, CreateContainerOptions, ObjectInfo, ObjectStore};
