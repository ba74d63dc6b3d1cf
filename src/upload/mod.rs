mod coordinator;
mod files;
mod poller;
mod types;

pub use coordinator::{decode_content, encode_content, UploadCoordinator};
pub use files::collect_files;
pub use poller::ConversionPoller;
pub use types::{BatchReport, ConversionStatus, FileSource, FileStatus, StatusBoard, UploadFile};
