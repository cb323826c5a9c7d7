//! Job lifecycle services: upload validation, processing, status reports.

pub mod report;
pub mod service;
pub mod upload;

pub use report::{JobDiagnostics, JobStatusReport};
pub use service::{JobService, OutputDownload};
pub use upload::{UploadPolicy, UploadReceipt};
