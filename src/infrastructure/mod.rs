pub mod cli;
#[cfg(test)]
pub(crate) mod fake_haproxy;
pub mod haproxy_client;
pub mod renderer;
pub mod settings;
