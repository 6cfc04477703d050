//! File access backends for Burrow
//!
//! Only the local filesystem is implemented. [`init`] turns a configuration
//! into a ready [`FileAccessState`].

mod launcher;
mod local;
pub mod mime;
mod sandbox;
mod tree;

pub use launcher::CommandLauncher;
pub use local::{LocalBackend, DIRECTORY_MODE};
pub use mime::MimeProbe;
pub use sandbox::{Follow, Sandbox};
pub use tree::delete_tree;

use burrow_core::{BackendConfig, FileAccessState};

/// Bind the backend named by `config`. No filesystem I/O happens here.
pub fn init(config: &BackendConfig) -> FileAccessState {
    match config {
        BackendConfig::Local(local) => {
            FileAccessState::new(local.root.clone(), Box::new(LocalBackend::new(local)))
        }
    }
}

/// Tear down a state obtained from [`init`].
pub fn deinit(state: FileAccessState) -> bool {
    state.deinit()
}
