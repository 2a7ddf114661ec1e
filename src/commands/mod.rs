pub mod extract;
pub mod init;
pub mod rank;
pub mod title;
