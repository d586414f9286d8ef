pub mod context;
pub mod detect;
pub mod init;
pub mod state;
pub mod status;
pub mod task;
pub mod track;
