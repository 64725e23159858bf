pub mod generator;
pub mod pages;
pub mod query;
pub mod serialize;

pub use generator::{GenerateReport, SiteGenerator};
pub use pages::{
    ContactsContext, HomeContext, PageContext, PostDetailContext, TagFilterContext,
};
pub use query::{CommentQuery, PostOrder, PostQuery, TagQuery};
pub use serialize::{
    serialize_comment, serialize_post, serialize_post_detail, serialize_tag, CommentRecord,
    PostDetailRecord, PostRecord, PostTags, TagRecord,
};
