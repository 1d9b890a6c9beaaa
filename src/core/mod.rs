pub mod links;
pub mod pipeline;
pub mod retry;

pub use crate::domain::model::{DiscussionPost, PublishedDiscussion, TrendItem};
pub use crate::domain::ports::{CredentialProvider, DiscussionBackend, LinkProbe, TrendGenerator};
pub use crate::utils::error::Result;
