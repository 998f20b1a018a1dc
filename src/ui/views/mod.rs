pub mod deploy;
pub mod monitor;
pub mod push;
