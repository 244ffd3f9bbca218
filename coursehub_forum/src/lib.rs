pub mod api;
pub mod comments;
pub mod config;
pub mod error;
pub mod likes;
pub mod models;
pub mod telemetry;
pub mod thread_view;

pub use api::{ApiClient, ForumApi};
pub use comments::CommentTree;
pub use config::ClientConfig;
pub use error::{ForumError, ForumResult};
pub use likes::{LikeDisplay, LikeTarget};
pub use thread_view::{Notice, NoticeLevel, ThreadMessage, ThreadView};
