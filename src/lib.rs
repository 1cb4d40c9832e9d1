pub mod init;

pub use init::{AppState, AppStateBuilder};
