mod generated;
mod templates;

use async_trait::async_trait;

use crate::domain::Category;

pub use generated::GeneratedReplies;
pub use templates::TemplateReplies;

#[async_trait]
pub trait ReplyWriter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Always returns non-empty text.
    async fn reply_for(&self, content: &str, category: Category) -> String;
}
