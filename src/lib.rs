pub mod app;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod session;
pub mod upload;
pub mod utils;
pub mod view;

pub use config::{PollPolicy, UploaderConfig};
pub use session::{Session, SessionEvent};
