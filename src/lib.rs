//! A resumable upload session for [tus](https://tus.io) enabled endpoints.
//!
//! The session speaks the core protocol (POST to create, HEAD to query the
//! offset, PATCH to append) through any [`HttpHandler`]. Enable the
//! `reqwest` feature for a ready-made blocking transport.

pub mod config;
mod error;
pub mod headers;
pub mod http;
#[cfg(feature = "reqwest")]
mod reqwest;
mod session;

pub use crate::config::SessionConfig;
pub use crate::error::{Error, Result};
pub use crate::http::{HttpHandler, HttpMethod, HttpRequest, HttpResponse};
pub use crate::session::{SessionState, UploadSession};

/// What an endpoint reports in response to OPTIONS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub supported_versions: Vec<String>,
    pub extensions: Vec<TusExtension>,
    pub max_upload_size: Option<u64>,
}

impl ServerInfo {
    pub fn supports(&self, extension: &TusExtension) -> bool {
        self.extensions.contains(extension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TusExtension {
    Creation,
    CreationWithUpload,
    CreationDeferLength,
    Termination,
    Concatenation,
    Checksum,
    Expiration,
    Other(String),
}

impl From<&str> for TusExtension {
    fn from(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "creation" => TusExtension::Creation,
            "creation-with-upload" => TusExtension::CreationWithUpload,
            "creation-defer-length" => TusExtension::CreationDeferLength,
            "termination" => TusExtension::Termination,
            "concatenation" => TusExtension::Concatenation,
            "checksum" => TusExtension::Checksum,
            "expiration" => TusExtension::Expiration,
            _ => TusExtension::Other(String::from(name)),
        }
    }
}
