pub mod action;
pub mod endpoint;
pub mod stat;
