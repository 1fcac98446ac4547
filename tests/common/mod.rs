#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use tus_upload::{HttpHandler, HttpMethod, HttpRequest, HttpResponse, SessionConfig};

pub const ENDPOINT: &str = "/files/";

pub fn config() -> SessionConfig {
    SessionConfig::new(ENDPOINT)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fault {
    /// The transport times out before the server sees the request.
    TimeoutBeforeApply,
    /// The server applies the request, then the response is lost.
    TimeoutAfterApply,
    /// The server answers with a garbled `upload-offset`.
    GarbledOffset,
    /// The server answers POST without a location.
    MissingLocation,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body_len: Option<usize>,
}

struct Upload {
    length: u64,
    data: Vec<u8>,
}

/// An in-memory tus 1.0.0 server.
pub struct TestServer {
    uploads: RefCell<HashMap<String, Upload>>,
    next_id: Cell<usize>,
    fault: Cell<Option<Fault>>,
    requests: RefCell<Vec<RecordedRequest>>,
    pub tus_version: String,
    pub extensions: String,
    pub max_upload_size: u64,
}

impl Default for TestServer {
    fn default() -> Self {
        TestServer {
            uploads: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            fault: Cell::new(None),
            requests: RefCell::new(Vec::new()),
            tus_version: String::from("1.0.0"),
            extensions: String::from("creation,termination"),
            max_upload_size: 10 * 1024 * 1024,
        }
    }
}

impl TestServer {
    pub fn with_max_upload_size(max_upload_size: u64) -> Self {
        TestServer {
            max_upload_size,
            ..TestServer::default()
        }
    }

    pub fn with_capabilities(tus_version: &str, extensions: &str) -> Self {
        TestServer {
            tus_version: String::from(tus_version),
            extensions: String::from(extensions),
            ..TestServer::default()
        }
    }

    /// Arms a fault for the next request only.
    pub fn inject(&self, fault: Fault) {
        self.fault.set(Some(fault));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request recorded")
    }

    pub fn stored(&self, url: &str) -> Option<Vec<u8>> {
        self.uploads.borrow().get(url).map(|u| u.data.clone())
    }

    pub fn remove(&self, url: &str) {
        self.uploads.borrow_mut().remove(url);
    }

    fn respond(&self, req: &HttpRequest<'_>, fault: Option<Fault>) -> HttpResponse {
        if req.headers.get("tus-resumable").map(String::as_str) != Some("1.0.0")
            && req.method != HttpMethod::Options
        {
            return status(412);
        }

        match req.method {
            HttpMethod::Options => {
                let mut response = status(204);
                insert(&mut response, "tus-version", &self.tus_version);
                insert(&mut response, "tus-extension", &self.extensions);
                insert(&mut response, "tus-max-size", &self.max_upload_size.to_string());
                response
            }
            HttpMethod::Post => {
                let length: u64 = match req.headers.get("upload-length").and_then(|l| l.parse().ok()) {
                    Some(length) => length,
                    None => return status(400),
                };
                if length > self.max_upload_size {
                    return status(413);
                }
                let id = self.next_id.get();
                self.next_id.set(id + 1);
                let location = format!("up-{}", id);
                self.uploads.borrow_mut().insert(
                    format!("{}{}", ENDPOINT, location),
                    Upload {
                        length,
                        data: Vec::new(),
                    },
                );
                let mut response = status(201);
                if fault != Some(Fault::MissingLocation) {
                    insert(&mut response, "Location", &location);
                }
                response
            }
            HttpMethod::Head => match self.uploads.borrow().get(&req.url) {
                Some(upload) => {
                    let mut response = status(200);
                    let offset = if fault == Some(Fault::GarbledOffset) {
                        String::from("twelve")
                    } else {
                        upload.data.len().to_string()
                    };
                    insert(&mut response, "Upload-Offset", &offset);
                    insert(&mut response, "Upload-Length", &upload.length.to_string());
                    response
                }
                None => status(404),
            },
            HttpMethod::Patch => {
                let mut uploads = self.uploads.borrow_mut();
                let upload = match uploads.get_mut(&req.url) {
                    Some(upload) => upload,
                    None => return status(404),
                };
                if req.headers.get("content-type").map(String::as_str)
                    != Some("application/offset+octet-stream")
                {
                    return status(415);
                }
                let declared: u64 = match req.headers.get("upload-offset").and_then(|o| o.parse().ok()) {
                    Some(offset) => offset,
                    None => return status(400),
                };
                let current = upload.data.len() as u64;
                if declared != current {
                    let mut response = status(409);
                    insert(&mut response, "Upload-Offset", &current.to_string());
                    return response;
                }
                let body = req.body.unwrap_or_default();
                if current + body.len() as u64 > upload.length {
                    return status(413);
                }
                upload.data.extend_from_slice(body);
                let mut response = status(204);
                insert(&mut response, "Upload-Offset", &upload.data.len().to_string());
                response
            }
            HttpMethod::Delete => match self.uploads.borrow_mut().remove(&req.url) {
                Some(_) => status(204),
                None => status(404),
            },
        }
    }
}

impl HttpHandler for TestServer {
    fn handle_request(&self, req: HttpRequest<'_>) -> io::Result<HttpResponse> {
        self.requests.borrow_mut().push(RecordedRequest {
            method: req.method,
            url: req.url.clone(),
            headers: req.headers.clone(),
            body_len: req.body.map(<[u8]>::len),
        });

        let fault = self.fault.take();
        if fault == Some(Fault::TimeoutBeforeApply) {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "request timed out"));
        }
        let response = self.respond(&req, fault);
        if fault == Some(Fault::TimeoutAfterApply) {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "response timed out"));
        }
        Ok(response)
    }
}

fn status(status_code: u16) -> HttpResponse {
    HttpResponse {
        status_code,
        ..HttpResponse::default()
    }
}

fn insert(response: &mut HttpResponse, name: &str, value: &str) {
    response.headers.insert(name.to_owned(), value.to_owned());
}

pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
