use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;
use tracing::debug;

use crate::{config::Config, error::ProviderError};

/// A GET request as adapters describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { url: url.into(), query: Vec::new(), headers: Vec::new() }
    }

    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

/// Status and body of a completed exchange. Non-2xx statuses are not errors
/// at this layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport capability handed to every adapter and to site lookup.
#[async_trait]
pub trait HttpClient: Send + Sync + Debug {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    http: Client,
}

impl ReqwestHttpClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError> {
        debug!(url = %request.url, "GET");

        let mut builder = self.http.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let transport = |e: reqwest::Error| ProviderError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let res = builder.send().await.map_err(transport)?;
        let status = res.status().as_u16();
        let body = res.text().await.map_err(transport)?;

        debug!(url = %request.url, status, bytes = body.len(), "response");
        Ok(HttpResponse { status, body })
    }
}

/// In-memory `HttpClient` serving canned responses by URL.
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::{collections::HashMap, sync::Mutex};

    #[derive(Debug, Clone)]
    enum Route {
        Respond(HttpResponse),
        Fail(String),
    }

    #[derive(Debug, Default)]
    pub struct FakeHttp {
        routes: HashMap<String, Route>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl FakeHttp {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
            let response = HttpResponse { status, body: body.to_string() };
            self.routes.insert(url.to_string(), Route::Respond(response));
            self
        }

        pub fn fail(mut self, url: &str, message: &str) -> Self {
            self.routes.insert(url.to_string(), Route::Fail(message.to_string()));
            self
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HttpRequest {
        pub fn param(&self, name: &str) -> Option<&str> {
            self.query.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
        }
    }

    #[async_trait]
    impl HttpClient for FakeHttp {
        async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.routes.get(&request.url) {
                Some(Route::Respond(response)) => Ok(response.clone()),
                Some(Route::Fail(message)) => Err(ProviderError::Transport {
                    url: request.url.clone(),
                    message: message.clone(),
                }),
                None => Err(ProviderError::Transport {
                    url: request.url.clone(),
                    message: "no route".to_string(),
                }),
            }
        }
    }
}
