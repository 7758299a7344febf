//! Query HAProxy instances for server status and drive their admin form, through the HTTP
//! stats page.

pub mod errors;
pub mod infrastructure;
pub mod model;
pub mod modules;
