pub mod check;
pub mod init;
pub mod replay;
pub mod visibility;

pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use replay::{replay, ReplayArgs};
pub use visibility::{visibility, VisibilityArgs};
