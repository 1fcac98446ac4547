/// Where and how a session talks to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Creation endpoint, e.g. `https://tusd.tusdemo.net/files/`.
    pub endpoint: String,
    /// Sent as `Tus-Resumable` on every request.
    pub protocol_version: String,
    pub user_agent: String,
}

pub const DEFAULT_ENDPOINT: &str = "https://tusd.tusdemo.net/files/";
pub const DEFAULT_PROTOCOL_VERSION: &str = "1.0.0";

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            endpoint: String::from(DEFAULT_ENDPOINT),
            protocol_version: String::from(DEFAULT_PROTOCOL_VERSION),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SessionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        SessionConfig {
            endpoint: endpoint.into(),
            ..SessionConfig::default()
        }
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Turns a `Location` value into the URL requests should target.
    pub fn resolve(&self, location: &str) -> String {
        if location.contains("://") {
            return String::from(location);
        }
        if location.starts_with('/') {
            return format!("{}{}", self.origin(), location);
        }
        if self.endpoint.ends_with('/') {
            format!("{}{}", self.endpoint, location)
        } else {
            format!("{}/{}", self.endpoint, location)
        }
    }

    /// `scheme://authority` of the endpoint, or empty for a relative endpoint.
    fn origin(&self) -> &str {
        match self.endpoint.find("://") {
            Some(scheme_end) => {
                let authority_start = scheme_end + 3;
                match self.endpoint[authority_start..].find('/') {
                    Some(path_start) => &self.endpoint[..authority_start + path_start],
                    None => &self.endpoint,
                }
            }
            None => "",
        }
    }
}
