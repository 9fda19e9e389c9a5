pub mod check;
pub mod export;
pub mod init;

pub use check::{check, CheckArgs};
pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
