//! Upload Gateway services

pub mod naming;
mod upload_service;

pub use naming::{
    Clock, FixedClock, NameGenerator, RandomSuffix, SequenceSuffix, SuffixSource, SystemClock,
    ALLOWED_EXTENSIONS,
};
pub use upload_service::{
    HealthStatus, IncomingFile, UploadService, UploadedFile, HEALTH_MESSAGE,
    MULTIPLE_UPLOAD_FIELD, SINGLE_UPLOAD_FIELDS,
};
