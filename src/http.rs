use crate::config::SessionConfig;
use std::collections::HashMap;
use std::fmt;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Head,
    Patch,
    Options,
    Post,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct HttpRequest<'a> {
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub url: String,
    pub body: Option<&'a [u8]>,
}

impl<'a> fmt::Display for HttpRequest<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} {}", self.method, self.url)?;
        write_headers(f, &self.headers)?;
        if let Some(body) = self.body {
            writeln!(f, "<{} byte body>", body.len())?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HttpResponse {
    pub headers: HashMap<String, String>,
    pub status_code: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Looks up a header regardless of how the transport cased its name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
    }
}

impl fmt::Display for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.status_code)?;
        write_headers(f, &self.headers)?;
        if !self.body.is_empty() {
            writeln!(f, "{}", String::from_utf8_lossy(&self.body))?;
        }
        Ok(())
    }
}

fn write_headers(f: &mut fmt::Formatter, headers: &HashMap<String, String>) -> fmt::Result {
    let mut names: Vec<&String> = headers.keys().collect();
    names.sort();
    for name in names {
        writeln!(f, "{}: {}", name, headers[name])?;
    }
    Ok(())
}

/// A connected transport that carries one request at a time.
///
/// Connection setup, TLS and timeouts belong to the implementor. Any failure
/// to obtain a complete response must be reported as an `io::Error`.
pub trait HttpHandler {
    fn handle_request(&self, req: HttpRequest<'_>) -> io::Result<HttpResponse>;
}

impl<H: HttpHandler + ?Sized> HttpHandler for &H {
    fn handle_request(&self, req: HttpRequest<'_>) -> io::Result<HttpResponse> {
        (**self).handle_request(req)
    }
}

impl<H: HttpHandler + ?Sized> HttpHandler for Box<H> {
    fn handle_request(&self, req: HttpRequest<'_>) -> io::Result<HttpResponse> {
        (**self).handle_request(req)
    }
}

pub fn default_headers(config: &SessionConfig) -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert(
        String::from(crate::headers::TUS_RESUMABLE),
        config.protocol_version.clone(),
    );
    map.insert(
        String::from(crate::headers::USER_AGENT),
        config.user_agent.clone(),
    );
    map
}
