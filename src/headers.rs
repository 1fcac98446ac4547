/// Indicates a byte offset within a resource.
pub const UPLOAD_OFFSET: &str = "upload-offset";

/// Indicates the size of the entire upload in bytes.
pub const UPLOAD_LENGTH: &str = "upload-length";

/// A comma-separated list of protocol versions supported by the server.
pub const TUS_VERSION: &str = "tus-version";

/// The version of the protocol used by the client or the server.
pub const TUS_RESUMABLE: &str = "tus-resumable";

/// A comma-separated list of the extensions supported by the server.
pub const TUS_EXTENSION: &str = "tus-extension";

/// Integer indicating the maximum allowed size of an entire upload in bytes.
pub const TUS_MAX_SIZE: &str = "tus-max-size";

/// Comma-separated `key base64(value)` pairs sent when creating an upload.
pub const UPLOAD_METADATA: &str = "upload-metadata";

/// URL of a newly created upload.
pub const LOCATION: &str = "location";

pub const CONTENT_TYPE: &str = "content-type";

pub const CONTENT_LENGTH: &str = "content-length";

pub const USER_AGENT: &str = "user-agent";

/// Media type every PATCH body must declare.
pub const OFFSET_OCTET_STREAM: &str = "application/offset+octet-stream";
