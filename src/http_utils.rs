use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;

use crate::api::ErrorBody;
use crate::cli_utils;

/// Default address of a local `storefrontd`.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// A non-success response from the catalog.
#[derive(Debug)]
pub struct HttpError {
    status: u16,
    message: String,
}

impl HttpError {
    /// HTTP status code of the failed response.
    pub fn status(&self) -> u16 {
        self.status
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl Error for HttpError {}

/// Client of the catalog read and admin APIs.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Constructs a full URL from a path
    pub fn url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.base_url, path)
    }

    /// Makes a GET request and handles the response
    pub async fn get<T>(&self, path: &str) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let response = self.client.get(self.url(path)).send().await?;
        self.handle_response(response).await
    }

    /// Makes a POST request with JSON body and handles the response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Box<dyn Error>>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Makes a PUT request with JSON body and handles the response
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, Box<dyn Error>>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Handles HTTP response, deserializing success or returning error
    async fn handle_response<T>(&self, response: Response) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.error,
            Err(_) if text.is_empty() => "No error details".to_string(),
            Err(_) => text,
        };
        Err(Box::new(HttpError {
            status: status.as_u16(),
            message,
        }))
    }
}

/// Execute an HTTP operation and exit on error with formatted message
pub async fn execute_or_exit<T, F, Fut>(operation: F, context: &str) -> T
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, Box<dyn Error>>>,
{
    match operation().await {
        Ok(result) => result,
        Err(e) => cli_utils::exit_with_error(&format!("{}: {}", context, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_with_one_slash() {
        let client = CatalogClient::new("http://localhost:8080/".to_string());
        assert_eq!(client.url("/categories"), "http://localhost:8080/categories");
        assert_eq!(
            client.url("admin/products"),
            "http://localhost:8080/admin/products"
        );
    }
}
