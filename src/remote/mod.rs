// Remote transport module

pub mod exec;


pub use exec::{Executor, ExecOutput, SshExecutor, DEFAULT_COMMAND_TIMEOUT};
