use crate::headers;
use crate::http::{HttpHandler, HttpMethod, HttpRequest, HttpResponse};
use reqwest::blocking::{Body, Client};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::collections::HashMap;
use std::io::{self, Cursor};
use std::str::FromStr;

impl HttpHandler for Client {
    fn handle_request(&self, req: HttpRequest<'_>) -> io::Result<HttpResponse> {
        let mut include_length = false;
        let mut header_map = HeaderMap::new();
        for (key, value) in &req.headers {
            // reqwest derives Content-Length from the body itself.
            if key.eq_ignore_ascii_case(headers::CONTENT_LENGTH) {
                include_length = true;
                continue;
            }
            let name = HeaderName::from_str(key)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            header_map.insert(name, value);
        }

        let mut builder = match req.method {
            HttpMethod::Head => self.head(&req.url),
            HttpMethod::Patch => self.patch(&req.url),
            HttpMethod::Options => self.request(Method::OPTIONS, &req.url),
            HttpMethod::Post => self.post(&req.url),
            HttpMethod::Delete => self.delete(&req.url),
        }
        .headers(header_map);

        if let Some(body) = req.body {
            builder = if include_length {
                builder.body(body.to_vec())
            } else {
                // A reader body has no known size, so it goes out chunked.
                builder.body(Body::new(Cursor::new(body.to_vec())))
            };
        }

        let response = builder.send().map_err(into_io_error)?;

        // Values that are not visible ASCII cannot carry tus fields; skip them.
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let status_code = response.status().as_u16();
        let body = response.bytes().map_err(into_io_error)?.to_vec();

        Ok(HttpResponse {
            headers,
            status_code,
            body,
        })
    }
}

fn into_io_error(err: reqwest::Error) -> io::Error {
    let kind = if err.is_timeout() {
        io::ErrorKind::TimedOut
    } else if err.is_connect() {
        io::ErrorKind::ConnectionRefused
    } else {
        io::ErrorKind::Other
    };
    io::Error::new(kind, err)
}
