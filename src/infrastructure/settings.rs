use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::HaproxyCtlError;
use crate::model::endpoint::{Credentials, Endpoint};

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub struct HaproxyCtlSettings {
    #[serde(default)]
    pub default_username: String,
    #[serde(default)]
    pub default_password: String,
    #[serde(default)]
    load_balancers: Vec<LoadBalancer>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancer {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Base64 `username:password`, applied on top of the other credentials
    pub auth_string: Option<String>,
}

impl HaproxyCtlSettings {
    pub fn load_from_file(path: &Path) -> Result<Self, HaproxyCtlError> {
        let content = fs::read_to_string(path).map_err(|error| {
            HaproxyCtlError::ConfigError(format!("could not read {}: {}", path.display(), error))
        })?;
        let settings = Self::parse(content.as_str())?;
        log::debug!("Settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Self, HaproxyCtlError> {
        let settings: HaproxyCtlSettings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Resolves the configured load balancers, in declaration order. Per load balancer
    /// credentials override the defaults field by field; an empty value inherits the default.
    pub fn endpoints(&self) -> Result<Vec<Endpoint>, HaproxyCtlError> {
        if self.load_balancers.is_empty() {
            return Err(HaproxyCtlError::ConfigError(String::from(
                "no load balancers configured",
            )));
        }

        let mut result = Vec::new();
        for lb in self.load_balancers.iter() {
            result.push(self.endpoint_for(lb)?);
        }
        for url in duplicate_base_urls(result.as_slice()) {
            log::warn!("{} is configured more than once, actions will be sent to it once per entry", url);
        }
        Ok(result)
    }

    fn endpoint_for(&self, lb: &LoadBalancer) -> Result<Endpoint, HaproxyCtlError> {
        let mut credentials = Credentials::build(
            inherit(&lb.username, &self.default_username),
            inherit(&lb.password, &self.default_password),
        );

        if let Some(auth_string) = &lb.auth_string {
            credentials.set_from_auth_string(auth_string).map_err(|error| {
                HaproxyCtlError::ConfigError(format!("load balancer {}: {}", lb.name, error))
            })?;
        }

        Endpoint::build(lb.name.as_str(), lb.url.as_str(), credentials)
    }
}

/// Base URLs shared by more than one load balancer entry, in order of first repetition
fn duplicate_base_urls(endpoints: &[Endpoint]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for endpoint in endpoints {
        let url = endpoint.base_url();
        if !seen.insert(url) && !duplicates.contains(&url) {
            duplicates.push(url);
        }
    }
    duplicates
}

fn inherit<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}
