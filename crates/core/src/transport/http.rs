use reqwest::{
    blocking::{Client, ClientBuilder},
    header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, USER_AGENT},
};

use crate::{
    config::AppConfig,
    error::{Error, Result},
};

use super::{Request, Response, Transport};

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

/// Blocking HTTP transport that mimics the web client.
///
/// Every call carries the fixed browser headers and the account's basic-auth
/// credentials.
pub struct HttpTransport {
    client: Client,
    username: String,
    password: String,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_builder(Client::builder(), config)
    }

    fn with_builder(builder: ClientBuilder, config: &AppConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, header_value("Origin", &config.origin)?);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(USER_AGENT, header_value("User-Agent", &config.user_agent)?);

        let client = builder
            .default_headers(headers)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .basic_auth(&self.username, Some(&self.password));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(Response { status, body })
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|source| Error::Header { name, source })
}
