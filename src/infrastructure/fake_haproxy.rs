//! In-process stand-in for the HAProxy stats page, used by tests.

use std::convert::Infallible;
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};

use hyper::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};

#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// How the fake answers the stats export (GET) and the admin form (POST)
#[derive(Clone, Debug)]
pub(crate) struct Reply {
    stats_status: StatusCode,
    stats_body: String,
    action_status: StatusCode,
    location: Option<String>,
}

impl Reply {
    pub fn stats(status: StatusCode, body: &str) -> Self {
        Reply {
            stats_status: status,
            stats_body: body.to_string(),
            action_status: StatusCode::METHOD_NOT_ALLOWED,
            location: None,
        }
    }

    pub fn action(status: StatusCode, location: Option<&str>) -> Self {
        Reply {
            stats_status: StatusCode::METHOD_NOT_ALLOWED,
            stats_body: String::new(),
            action_status: status,
            location: location.map(String::from),
        }
    }
}

pub(crate) struct FakeHaproxy {
    address: SocketAddr,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeHaproxy {
    pub async fn start(reply: Reply) -> Self {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let service_recorded = recorded.clone();

        let make_service = make_service_fn(move |_conn| {
            let recorded = service_recorded.clone();
            let reply = reply.clone();
            let service = service_fn(move |request| respond(request, recorded.clone(), reply.clone()));
            async move { Ok::<_, Infallible>(service) }
        });

        let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_service);
        let address = server.local_addr();
        tokio::spawn(server);

        FakeHaproxy { address, recorded }
    }

    /// Base URL, with the trailing slash operators usually configure
    pub fn url(&self) -> String {
        format!("http://{}/", self.address)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }
}

async fn respond(
    request: Request<Body>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    reply: Reply,
) -> Result<Response<Body>, hyper::Error> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let authorization = header_value(&request, AUTHORIZATION);
    let content_type = header_value(&request, CONTENT_TYPE);
    let body = hyper::body::to_bytes(request.into_body()).await?;

    recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path,
        authorization,
        content_type,
        body: String::from_utf8_lossy(&body).to_string(),
    });

    let response = if method == Method::GET {
        Response::builder()
            .status(reply.stats_status)
            .body(Body::from(reply.stats_body))
    } else {
        let mut builder = Response::builder().status(reply.action_status);
        if let Some(location) = reply.location {
            builder = builder.header(LOCATION, location);
        }
        builder.body(Body::empty())
    };
    Ok(response.unwrap())
}

fn header_value(request: &Request<Body>, name: HeaderName) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

/// A URL nothing listens on
pub(crate) fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", address)
}
