pub mod download;
pub mod partition;

pub use download::download_command;
pub use partition::partition_command;
