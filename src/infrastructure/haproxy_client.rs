use std::str::FromStr;

use hyper::client::HttpConnector;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use hyper::{Body, Client, Method, Request, StatusCode, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};

use crate::errors::HaproxyCtlError;
use crate::model::action::{classify_location, Action, ActionOutcome, ActionResult};
use crate::model::endpoint::Endpoint;
use crate::model::stat::{decode_stats, StatRow};

type Transport = Client<HttpsConnector<HttpConnector>, Body>;

/// Talks to the stats page of one HAProxy instance.
///
/// hyper's client never follows redirects, which is what the admin form needs: the 303 HAProxy
/// answers a POST with is the result itself.
pub struct HaproxyClient {
    endpoint: Endpoint,
    transport: Transport,
}

impl HaproxyClient {
    pub fn build(endpoint: Endpoint) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let transport = Client::builder().build::<_, Body>(connector);

        HaproxyClient {
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// URI of the CSV export (`csv = true`) or of the HTML page holding the admin form
    pub fn request_uri(&self, csv: bool) -> String {
        if csv {
            format!("{}/haproxy;csv", self.endpoint.base_url())
        } else {
            format!("{}/haproxy", self.endpoint.base_url())
        }
    }

    /// Fetches and decodes the current statistics
    pub async fn get_stats(&self) -> Result<Vec<StatRow>, HaproxyCtlError> {
        let request = self
            .request_builder(Method::GET, true)?
            .body(Body::empty())?;
        log::debug!("Generated: {} {}", request.method(), request.uri());

        let response = self.transport.request(request).await?;
        if response.status() != StatusCode::OK {
            log::debug!(
                "Unexpected status {} from {}",
                response.status(),
                self.endpoint.name
            );
            return Err(HaproxyCtlError::HttpStatusError(response.status()));
        }

        let body = hyper::body::to_bytes(response.into_body()).await?;
        decode_stats(&body)
    }

    /// Submits `action` for `servers` of `backend` through the admin form.
    ///
    /// A request may be applied to some of the servers but not others, in which case `done` is
    /// `true`, `all_ok` is `false` and the error holds a brief text.
    pub async fn send_action(&self, servers: &[String], backend: &str, action: Action) -> ActionResult {
        match self.submit_action(servers, backend, action).await {
            Ok(outcome) => ActionResult::from(outcome),
            Err(error) => ActionResult::failed(error),
        }
    }

    async fn submit_action(
        &self,
        servers: &[String],
        backend: &str,
        action: Action,
    ) -> Result<ActionOutcome, HaproxyCtlError> {
        let request = self
            .request_builder(Method::POST, false)?
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(action_form(servers, backend, action)))?;
        log::debug!("Generated: {} {}", request.method(), request.uri());

        let response = self.transport.request(request).await?;
        if response.status() != StatusCode::SEE_OTHER {
            return Err(HaproxyCtlError::HttpStatusError(response.status()));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        log::debug!("{} redirected to {:?}", self.endpoint.name, location);

        Ok(classify_location(location))
    }

    fn request_builder(
        &self,
        method: Method,
        csv: bool,
    ) -> Result<hyper::http::request::Builder, HaproxyCtlError> {
        let uri = Uri::from_str(self.request_uri(csv).as_str())?;
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(authorization) = self.endpoint.credentials.basic_auth_header() {
            builder = builder.header(AUTHORIZATION, authorization);
        }
        Ok(builder)
    }
}

/// Form body of the admin form: one `s` per server, then `action` and `b`
fn action_form(servers: &[String], backend: &str, action: Action) -> String {
    let mut form = url::form_urlencoded::Serializer::new(String::new());
    for server in servers {
        form.append_pair("s", server);
    }
    form.append_pair("action", action.code());
    form.append_pair("b", backend);
    form.finish()
}
