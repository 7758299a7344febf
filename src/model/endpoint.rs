use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hyper::Uri;

use crate::errors::HaproxyCtlError;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn build(username: &str, password: &str) -> Self {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Replaces the credentials with the ones carried by a Basic auth string (the Base64 value
    /// of an `Authorization: Basic` header). Leaves them untouched on error.
    pub fn set_from_auth_string(&mut self, auth_string: &str) -> Result<(), HaproxyCtlError> {
        let decoded = STANDARD.decode(auth_string.trim())?;
        let decoded = String::from_utf8(decoded).map_err(|_| {
            HaproxyCtlError::AuthDecodeError(String::from("auth string is not valid utf-8"))
        })?;

        let parts: Vec<&str> = decoded.split(':').collect();
        match parts.as_slice() {
            [username, password] => {
                self.username = username.to_string();
                self.password = password.to_string();
                Ok(())
            }
            _ => Err(HaproxyCtlError::AuthDecodeError(String::from(
                "auth string is not a username/password combination",
            ))),
        }
    }

    /// `Authorization` header value, if a username is configured
    pub fn basic_auth_header(&self) -> Option<String> {
        if self.username.is_empty() {
            return None;
        }
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        Some(format!("Basic {}", token))
    }
}

/// One configured HAProxy instance
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    pub name: String,
    base_url: String,
    pub credentials: Credentials,
}

impl Endpoint {
    /// Returns an error if `url` is not an absolute http(s) URL without query or fragment
    pub fn build(name: &str, url: &str, credentials: Credentials) -> Result<Self, HaproxyCtlError> {
        let parsed = url::Url::parse(url).map_err(|error| {
            HaproxyCtlError::ConfigError(format!(
                "invalid url {:?} for load balancer {}: {}",
                url, name, error
            ))
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(HaproxyCtlError::ConfigError(format!(
                    "unsupported scheme {} for load balancer {}",
                    scheme, name
                )))
            }
        }
        if parsed.host_str().is_none() {
            return Err(HaproxyCtlError::ConfigError(format!(
                "missing host in url for load balancer {}",
                name
            )));
        }

        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(HaproxyCtlError::ConfigError(format!(
                "url for load balancer {} must not carry a query or fragment",
                name
            )));
        }

        let base_url = parsed.as_str().trim_end_matches('/').to_string();
        Uri::from_str(base_url.as_str()).map_err(|error| {
            HaproxyCtlError::ConfigError(format!(
                "invalid url {:?} for load balancer {}: {}",
                url, name, error
            ))
        })?;

        Ok(Endpoint {
            name: name.to_string(),
            base_url,
            credentials,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }
}
