/// Backend-assigned image identifier. Opaque and stable for a session.
pub type ImageId = String;

/// Backend-assigned generation job identifier.
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
