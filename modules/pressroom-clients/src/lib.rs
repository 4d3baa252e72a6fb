//! Concrete collaborator implementations behind the pipeline traits:
//! HTTP analytics, JSON-file draft store, object storage, CMS and
//! headless-store publishers, Slack notifications, media fetching.

pub mod analytics;
pub mod cms;
pub mod draft_store;
pub mod headless;
pub mod media;
pub mod notifier;
pub mod storage;

pub use analytics::{HttpAnalytics, UnconfiguredAnalytics};
pub use cms::RestCms;
pub use draft_store::JsonDraftStore;
pub use headless::HeadlessClient;
pub use media::HttpMediaFetcher;
pub use notifier::{LogNotifier, SlackNotifier};
pub use storage::{FsObjectStore, HttpObjectStore};
