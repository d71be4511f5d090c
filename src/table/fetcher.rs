//! Remote resource fetcher for the published exchange-rate table
//!
//! Downloads the latest table from the configured endpoint and holds it
//! in memory until it is either written into the table directory or
//! discarded. A held resource can be written at most once.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use log::{debug, info, warn};
use regex::Regex;
use reqwest::header::{HeaderValue, CONTENT_DISPOSITION};
use reqwest::Client;

use super::{Result, TableError, TableVersionName};

fn quoted_filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#""([^"]*)""#).expect("valid filename pattern"))
}

/// Table content together with the name the server proposed for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub name: TableVersionName,
    pub content: Vec<u8>,
}

/// Client for the remote table endpoint
#[derive(Debug)]
pub struct ResourceFetcher {
    /// HTTP client for making requests
    http_client: Client,
    /// Endpoint serving the latest table
    url: String,
    /// Resource from the last successful fetch, until written or cleared
    resource: Option<FetchedResource>,
}

impl ResourceFetcher {
    /// Creates a fetcher for `url` whose requests give up after `timeout`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            url: url.into(),
            resource: None,
        })
    }

    /// The table held since the last successful fetch, if any
    pub fn resource(&self) -> Option<&FetchedResource> {
        self.resource.as_ref()
    }

    /// Proposed name of the held table, if any
    pub fn resource_table_name(&self) -> Option<&TableVersionName> {
        self.resource.as_ref().map(|r| &r.name)
    }

    /// Discards the held resource without writing it
    pub fn clear(&mut self) {
        if let Some(resource) = self.resource.take() {
            debug!("Discarded fetched table {}", resource.name);
        }
    }

    /// Fetches the latest table and holds it for [`download_table`](Self::download_table)
    ///
    /// # Returns
    /// * `Ok(&FetchedResource)` - The fetched table and its proposed name
    /// * `Err(TableError::TransportFailure)` - Timeout, connection error or non-success status
    /// * `Err(TableError::MalformedResponse)` - No usable filename in `Content-Disposition`
    ///
    /// On any error the previously held resource is dropped as well.
    pub async fn fetch_latest(&mut self) -> Result<&FetchedResource> {
        self.resource = None;
        info!("Fetching latest table from {}", self.url);

        let result = self.request().await;
        match result {
            Ok(resource) => {
                debug!(
                    "Fetched {} ({} bytes)",
                    resource.name,
                    resource.content.len()
                );
                Ok(self.resource.insert(resource))
            }
            Err(e) => {
                match &e {
                    TableError::MalformedResponse(reason) => {
                        warn!("Response from {} is malformed: {}", self.url, reason)
                    }
                    other => warn!("Could not reach {}: {}", self.url, other),
                }
                Err(e)
            }
        }
    }

    async fn request(&self) -> Result<FetchedResource> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let name = parse_content_disposition(response.headers().get(CONTENT_DISPOSITION))?;
        let content = response.bytes().await?.to_vec();

        Ok(FetchedResource { name, content })
    }

    /// Writes the held resource into `destination` and releases it
    ///
    /// The file is written under a temporary name first and renamed into
    /// place, so a partial write never looks like a table.
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Path of the written table
    /// * `Err(TableError::NotFound)` - `destination` is not an existing directory
    /// * `Err(TableError::InvalidState)` - Nothing has been fetched
    /// * `Err(TableError::Io)` - The write failed; the resource is kept
    pub fn download_table(&mut self, destination: &Path) -> Result<PathBuf> {
        if !destination.is_dir() {
            return Err(TableError::NotFound(destination.to_path_buf()));
        }
        let resource = self
            .resource
            .as_ref()
            .ok_or(TableError::InvalidState("no fetched table to download"))?;

        let target = destination.join(resource.name.as_str());
        let partial = destination.join(resource.name.partial_file_name());
        let written = fs::write(&partial, &resource.content)
            .map_err(|e| TableError::io(&partial, e))
            .and_then(|()| fs::rename(&partial, &target).map_err(|e| TableError::io(&target, e)));
        if let Err(e) = written {
            discard_partial(&partial);
            return Err(e);
        }

        info!("Downloaded table {}", target.display());
        self.resource = None;
        Ok(target)
    }
}

/// Removes an unfinished download, logging if it cannot be removed
fn discard_partial(partial: &Path) {
    match fs::remove_file(partial) {
        Ok(()) => debug!("Removed unfinished download {}", partial.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Failed to remove unfinished download {}: {}",
            partial.display(),
            e
        ),
    }
}

/// Extracts the quoted filename from a `Content-Disposition` header
fn parse_content_disposition(header: Option<&HeaderValue>) -> Result<TableVersionName> {
    let header = header.ok_or_else(|| {
        TableError::MalformedResponse("missing Content-Disposition header".to_string())
    })?;
    let value = header.to_str().map_err(|_| {
        TableError::MalformedResponse("Content-Disposition is not valid text".to_string())
    })?;

    let quoted = quoted_filename_pattern()
        .captures(value)
        .and_then(|c| c.get(1))
        .ok_or_else(|| {
            TableError::MalformedResponse(format!("no quoted filename in '{}'", value))
        })?;

    let name = TableVersionName::new(quoted.as_str())
        .map_err(|e| TableError::MalformedResponse(e.to_string()))?;
    if !name.is_table_file() {
        return Err(TableError::MalformedResponse(format!(
            "'{}' is not a table file name",
            name
        )));
    }
    Ok(name)
}
