//! 检索层：带回退的网络搜索与带超时的百科获取

pub mod types;
pub mod web_search;
pub mod wikipedia;

pub use types::{Outcome, RetrievalError, RetrievalResult, Snippet, Source};
pub use web_search::{FallbackWebSearch, WebSearch};
pub use wikipedia::{Encyclopedia, WikipediaClient, fetch_with_timeout};
