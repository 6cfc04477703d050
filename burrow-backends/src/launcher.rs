//! Default process launcher

use burrow_core::{ExecutingFile, ProcessLauncher};
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Spawns the program directly; `args` is split on whitespace, no shell
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLauncher;

impl ProcessLauncher for CommandLauncher {
    fn launch(&self, program: &Path, args: &str) -> io::Result<ExecutingFile> {
        let child = Command::new(program).args(args.split_whitespace()).spawn()?;
        debug!(program = %program.display(), pid = child.id(), "process started");
        Ok(ExecutingFile::new(child))
    }
}
