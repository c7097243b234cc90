mod init;
mod lookup;
mod stats;

pub use init::cmd_init;
pub use lookup::cmd_lookup;
pub use stats::cmd_stats;
