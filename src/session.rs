use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::headers;
use crate::http::{default_headers, HttpHandler, HttpMethod, HttpRequest, HttpResponse};
use crate::{ServerInfo, TusExtension};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Where a session stands in the upload lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No upload resource exists yet.
    Created,
    /// The server has issued a location, no bytes accepted yet.
    LocationKnown,
    /// Some, but not all, bytes have been accepted.
    Uploading,
    Completed,
    /// The upload resource vanished server-side.
    Failed,
    /// The upload was deleted through the termination extension.
    Terminated,
}

/// Drives one resumable upload over a caller-supplied transport.
///
/// The session is single-owner: every operation takes `&mut self` and
/// blocks until the transport returns. The local offset only moves after a
/// response has been fully validated, so a failed or interrupted request
/// never advances it.
pub struct UploadSession<'a> {
    http_handler: Box<dyn HttpHandler + 'a>,
    config: SessionConfig,
    state: SessionState,
    location: Option<String>,
    total_length: u64,
    offset: u64,
}

impl<'a> UploadSession<'a> {
    pub fn new(http_handler: impl HttpHandler + 'a, config: SessionConfig) -> Self {
        UploadSession {
            http_handler: Box::new(http_handler),
            config,
            state: SessionState::Created,
            location: None,
            total_length: 0,
            offset: 0,
        }
    }

    /// Attaches to an upload created earlier and syncs its offset with the server.
    pub fn resume(
        http_handler: impl HttpHandler + 'a,
        config: SessionConfig,
        location: impl Into<String>,
        total_length: u64,
    ) -> Result<Self> {
        let mut session = UploadSession::new(http_handler, config);
        session.location = Some(location.into());
        session.total_length = total_length;
        session.state = SessionState::LocationKnown;
        session.query_offset()?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// True once the server holds every byte. A failed or terminated
    /// upload is never complete.
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Creates the upload resource and returns the location the server issued.
    pub fn create_upload(&mut self, total_length: u64) -> Result<String> {
        self.create(total_length, None)
    }

    /// Like [`create_upload`](Self::create_upload), also sending `Upload-Metadata`.
    pub fn create_upload_with_metadata(
        &mut self,
        total_length: u64,
        metadata: &HashMap<String, String>,
    ) -> Result<String> {
        self.create(total_length, Some(metadata))
    }

    fn create(
        &mut self,
        total_length: u64,
        metadata: Option<&HashMap<String, String>>,
    ) -> Result<String> {
        if self.state != SessionState::Created {
            return Err(self.invalid_state("create an upload"));
        }

        let mut request_headers = default_headers(&self.config);
        request_headers.insert(
            String::from(headers::UPLOAD_LENGTH),
            total_length.to_string(),
        );
        if let Some(metadata) = metadata.filter(|m| !m.is_empty()) {
            request_headers.insert(
                String::from(headers::UPLOAD_METADATA),
                encode_metadata(metadata),
            );
        }

        let response = self.send(HttpRequest {
            method: HttpMethod::Post,
            headers: request_headers,
            url: self.config.endpoint.clone(),
            body: None,
        })?;

        if response.status_code != 201 {
            return Err(unexpected_status("POST", &response));
        }
        let location = response
            .header(headers::LOCATION)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .ok_or_else(|| Error::Protocol(String::from("creation response lacks a location")))?;

        info!(location = %location, total_length, "upload created");
        self.location = Some(location.clone());
        self.total_length = total_length;
        self.offset = 0;
        self.state = if total_length == 0 {
            SessionState::Completed
        } else {
            SessionState::LocationKnown
        };
        Ok(location)
    }

    /// Asks the server how many bytes it holds and adopts that as the local offset.
    pub fn query_offset(&mut self) -> Result<u64> {
        let url = self.target_url("query the offset")?;

        let response = self.send(HttpRequest {
            method: HttpMethod::Head,
            headers: default_headers(&self.config),
            url,
            body: None,
        })?;

        if is_gone(&response) {
            return Err(self.gone());
        }
        if response.status_code != 200 && response.status_code != 204 {
            return Err(unexpected_status("HEAD", &response));
        }

        let server_offset = parse_offset(&response)?;
        if let Some(length) = response.header(headers::UPLOAD_LENGTH) {
            let length = parse_number(headers::UPLOAD_LENGTH, length)?;
            if length != self.total_length {
                return Err(Error::Protocol(format!(
                    "server reports upload length {}, expected {}",
                    length, self.total_length
                )));
            }
        }
        if server_offset > self.total_length {
            return Err(Error::Protocol(format!(
                "server offset {} exceeds upload length {}",
                server_offset, self.total_length
            )));
        }
        if server_offset < self.offset {
            return Err(Error::Protocol(format!(
                "server offset {} is behind accepted offset {}",
                server_offset, self.offset
            )));
        }

        self.advance_to(server_offset);
        Ok(server_offset)
    }

    /// Appends `bytes` at `declared_offset`.
    ///
    /// With `include_length` unset no `Content-Length` is declared and the
    /// server has to cope with a body of unspecified length.
    pub fn upload_chunk(
        &mut self,
        bytes: &[u8],
        declared_offset: u64,
        include_length: bool,
    ) -> Result<u64> {
        let url = self.target_url("upload a chunk")?;

        let end = match declared_offset.checked_add(bytes.len() as u64) {
            Some(end) if end <= self.total_length => end,
            end => {
                return Err(Error::LengthExceeded {
                    end: end.unwrap_or(u64::MAX),
                    total: self.total_length,
                })
            }
        };

        let mut request_headers = default_headers(&self.config);
        request_headers.insert(
            String::from(headers::CONTENT_TYPE),
            String::from(headers::OFFSET_OCTET_STREAM),
        );
        request_headers.insert(
            String::from(headers::UPLOAD_OFFSET),
            declared_offset.to_string(),
        );
        if include_length {
            request_headers.insert(
                String::from(headers::CONTENT_LENGTH),
                bytes.len().to_string(),
            );
        }

        let response = self.send(HttpRequest {
            method: HttpMethod::Patch,
            headers: request_headers,
            url,
            body: Some(bytes),
        })?;

        if response.status_code == 409 {
            let server = response
                .header(headers::UPLOAD_OFFSET)
                .and_then(|o| o.parse().ok());
            warn!(declared = declared_offset, ?server, "server rejected chunk offset");
            return Err(Error::OffsetConflict {
                declared: declared_offset,
                server,
            });
        }
        if is_gone(&response) {
            return Err(self.gone());
        }
        if response.status_code != 204 {
            return Err(unexpected_status("PATCH", &response));
        }

        let new_offset = parse_offset(&response)?;
        let no_progress = new_offset == declared_offset && !bytes.is_empty();
        if new_offset < declared_offset || new_offset > end || no_progress {
            return Err(Error::Protocol(format!(
                "server offset {} outside of the sent range {}..={}",
                new_offset, declared_offset, end
            )));
        }
        if new_offset < self.offset {
            return Err(Error::Protocol(format!(
                "server offset {} is behind accepted offset {}",
                new_offset, self.offset
            )));
        }

        self.advance_to(new_offset);
        Ok(new_offset)
    }

    /// Sends `payload[offset..]` in chunks of at most `chunk_size` bytes.
    pub fn upload_remaining(
        &mut self,
        payload: &[u8],
        chunk_size: usize,
        include_length: bool,
    ) -> Result<u64> {
        self.target_url("upload a chunk")?;
        if payload.len() as u64 != self.total_length {
            return Err(Error::PayloadMismatch {
                payload: payload.len() as u64,
                total: self.total_length,
            });
        }
        let chunk_size = chunk_size.max(1);

        while !self.is_complete() {
            let start = self.offset as usize;
            let stop = payload.len().min(start.saturating_add(chunk_size));
            self.upload_chunk(&payload[start..stop], self.offset, include_length)?;
        }
        Ok(self.offset)
    }

    /// Deletes the upload resource on the server.
    pub fn terminate(&mut self) -> Result<()> {
        let url = self.target_url("terminate the upload")?;

        let response = self.send(HttpRequest {
            method: HttpMethod::Delete,
            headers: default_headers(&self.config),
            url,
            body: None,
        })?;

        if is_gone(&response) {
            return Err(self.gone());
        }
        if response.status_code != 204 {
            return Err(unexpected_status("DELETE", &response));
        }

        info!(location = ?self.location, "upload terminated");
        self.state = SessionState::Terminated;
        Ok(())
    }

    /// Asks the endpoint which versions and extensions it supports.
    pub fn server_info(&self) -> Result<ServerInfo> {
        let response = self.send(HttpRequest {
            method: HttpMethod::Options,
            headers: default_headers(&self.config),
            url: self.config.endpoint.clone(),
            body: None,
        })?;

        if response.status_code != 200 && response.status_code != 204 {
            return Err(unexpected_status("OPTIONS", &response));
        }

        let supported_versions = split_list(response.header(headers::TUS_VERSION))
            .map(String::from)
            .collect();
        let extensions = split_list(response.header(headers::TUS_EXTENSION))
            .map(TusExtension::from)
            .collect();
        let max_upload_size = response
            .header(headers::TUS_MAX_SIZE)
            .map(|size| parse_number(headers::TUS_MAX_SIZE, size))
            .transpose()?;

        Ok(ServerInfo {
            supported_versions,
            extensions,
            max_upload_size,
        })
    }

    fn send(&self, req: HttpRequest<'_>) -> Result<HttpResponse> {
        let method = req.method;
        debug!(%method, url = %req.url, "sending request");
        match self.http_handler.handle_request(req) {
            Ok(response) => {
                debug!(%method, status = response.status_code, "received response");
                Ok(response)
            }
            Err(err) => {
                warn!(%method, error = %err, "transport failed");
                Err(Error::Transport(err))
            }
        }
    }

    fn target_url(&self, operation: &'static str) -> Result<String> {
        match (self.state, &self.location) {
            (SessionState::LocationKnown, Some(location))
            | (SessionState::Uploading, Some(location))
            | (SessionState::Completed, Some(location)) => Ok(self.config.resolve(location)),
            _ => Err(self.invalid_state(operation)),
        }
    }

    fn advance_to(&mut self, offset: u64) {
        self.offset = offset;
        if offset == self.total_length {
            if self.state != SessionState::Completed {
                info!(location = ?self.location, total_length = self.total_length, "upload complete");
            }
            self.state = SessionState::Completed;
        } else if offset > 0 {
            self.state = SessionState::Uploading;
        }
    }

    fn gone(&mut self) -> Error {
        self.state = SessionState::Failed;
        Error::NotFound(self.location.clone().unwrap_or_default())
    }

    fn invalid_state(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            state: self.state,
        }
    }
}

fn is_gone(response: &HttpResponse) -> bool {
    response.status_code == 404 || response.status_code == 410
}

fn unexpected_status(method: &str, response: &HttpResponse) -> Error {
    Error::Protocol(format!(
        "{} answered with status {}",
        method, response.status_code
    ))
}

fn parse_offset(response: &HttpResponse) -> Result<u64> {
    let value = response
        .header(headers::UPLOAD_OFFSET)
        .ok_or_else(|| Error::Protocol(String::from("response lacks upload-offset")))?;
    parse_number(headers::UPLOAD_OFFSET, value)
}

fn parse_number(header: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|e| Error::Protocol(format!("invalid {} '{}': {}", header, value, e)))
}

fn split_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Encodes metadata as sorted `key base64(value)` pairs.
fn encode_metadata(metadata: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&String, &String)> = metadata.iter().collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(key, value)| {
            if value.is_empty() {
                key.clone()
            } else {
                format!("{} {}", key, STANDARD.encode(value))
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
