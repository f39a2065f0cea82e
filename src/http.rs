//! HTTP and file transfer primitives.
//!
//! Everything that touches the network goes through [`HttpClient`], so tests can
//! swap in [`StaticResponseClient`] or [`RoutedClient`] and never need a live
//! connection.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use std::rc::Rc;
use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use crate::archive;
use crate::error::{Result, TransferError};
use crate::util::path_exists;

/// A response with its body not yet consumed.
pub struct HttpResponse {
    pub status: u16,
    pub body: Box<dyn Read>,
}

/// The minimal HTTP capability the manager needs: a blocking GET.
pub trait HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse, TransferError>;
}

/// The production client, a blocking `reqwest` client without a request timeout.
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, TransferError> {
        let client = Client::builder()
            .user_agent(concat!("gman/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| TransferError::Request {
                url: String::new(),
                details: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse, TransferError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransferError::Request {
                url: url.to_string(),
                details: e.to_string(),
            })?;
        Ok(HttpResponse {
            status: response.status().as_u16(),
            body: Box::new(response),
        })
    }
}

/// A client that answers every request with the same status and body, or the same error.
pub struct StaticResponseClient {
    status: u16,
    body: Vec<u8>,
    error: Option<String>,
}

impl StaticResponseClient {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            error: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            body: Vec::new(),
            error: Some(message.into()),
        }
    }
}

impl HttpClient for StaticResponseClient {
    fn get(&self, url: &str) -> Result<HttpResponse, TransferError> {
        if let Some(message) = &self.error {
            return Err(TransferError::Request {
                url: url.to_string(),
                details: message.clone(),
            });
        }
        Ok(HttpResponse {
            status: self.status,
            body: Box::new(Cursor::new(self.body.clone())),
        })
    }
}

/// A client serving fixed bodies per URL; unknown URLs get a 404.
/// Every requested URL is recorded.
#[derive(Default)]
pub struct RoutedClient {
    routes: HashMap<String, (u16, Vec<u8>)>,
    requests: RefCell<Vec<String>>,
}

impl RoutedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(url.into(), (status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl HttpClient for RoutedClient {
    fn get(&self, url: &str) -> Result<HttpResponse, TransferError> {
        self.requests.borrow_mut().push(url.to_string());
        let (status, body) = self
            .routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| (404, b"not found".to_vec()));
        Ok(HttpResponse {
            status,
            body: Box::new(Cursor::new(body)),
        })
    }
}

/// Fetches `url` and decodes its JSON body.
pub fn get_json<T: DeserializeOwned>(client: &dyn HttpClient, url: &str) -> Result<T, TransferError> {
    let response = client.get(url)?;
    if response.status != 200 {
        return Err(TransferError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }
    serde_json::from_reader(response.body).map_err(|e| TransferError::Decode {
        url: url.to_string(),
        details: e.to_string(),
    })
}

/// Moves artifacts from the network onto disk and unpacks them.
pub trait Transfer {
    /// Downloads `url` into `destination`. Returns `false` if nothing was done
    /// because `destination` exists and `overwrite` is not set.
    fn download_file(&self, url: &str, destination: &Path, overwrite: bool) -> Result<bool, TransferError>;

    /// Extracts `archive` into `destination`, with the same skip semantics.
    fn extract_archive(&self, archive: &Path, destination: &Path, overwrite: bool) -> Result<bool>;
}

/// [`Transfer`] over an [`HttpClient`] and the built-in archive formats.
pub struct HttpTransfer {
    client: Rc<dyn HttpClient>,
}

impl HttpTransfer {
    pub fn new(client: Rc<dyn HttpClient>) -> Self {
        Self { client }
    }
}

impl Transfer for HttpTransfer {
    fn download_file(&self, url: &str, destination: &Path, overwrite: bool) -> Result<bool, TransferError> {
        let write_error = |source: std::io::Error| TransferError::Write {
            path: destination.to_path_buf(),
            source,
        };
        if path_exists(destination) {
            if !overwrite {
                return Ok(false);
            }
            std::fs::remove_file(destination).map_err(write_error)?;
        }

        let mut response = self.client.get(url)?;
        if response.status != 200 {
            return Err(TransferError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let mut file = File::create(destination).map_err(write_error)?;
        let written = std::io::copy(&mut response.body, &mut file).map_err(|e| TransferError::Request {
            url: url.to_string(),
            details: e.to_string(),
        })?;
        file.sync_all().map_err(write_error)?;
        debug!("downloaded {written} bytes from {url} to {}", destination.display());
        Ok(true)
    }

    fn extract_archive(&self, archive_path: &Path, destination: &Path, overwrite: bool) -> Result<bool> {
        archive::extract(archive_path, destination, overwrite)
    }
}
