//! Process hand-off for executed files

use std::io;
use std::path::Path;
use std::process::{Child, ExitStatus};

/// A process started from a listed file.
///
/// Ownership passes to whoever receives it; dropping the handle neither waits
/// for nor kills the process.
#[derive(Debug)]
pub struct ExecutingFile {
    child: Child,
}

impl ExecutingFile {
    pub fn new(child: Child) -> Self {
        Self { child }
    }

    /// OS process id
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait()
    }

    pub fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    pub fn kill(&mut self) -> io::Result<()> {
        self.child.kill()
    }

    pub fn into_child(self) -> Child {
        self.child
    }
}

impl From<Child> for ExecutingFile {
    fn from(child: Child) -> Self {
        Self::new(child)
    }
}

/// Starts a program given its absolute path and a raw argument string
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, program: &Path, args: &str) -> io::Result<ExecutingFile>;
}
