pub mod create;
pub mod pull;
pub mod push;
pub mod remove;
pub mod status;
