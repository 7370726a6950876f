pub use comment::{CommentRepository, CommentRepositoryListReplies};
pub use like::{LikeRepository, LikeRepositoryToggle};
pub use user::{UserRepository, UserRepositoryResolveIdentity};

mod comment;
mod like;
mod user;
