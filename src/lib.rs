pub mod backup;
pub mod cli;
pub mod collect;
pub mod pin;

pub use backup::{backup, BackupReport};
pub use cli::{run, Cli, Commands};
