pub use comment::{
    Comment, CommentCreate, CommentDelete, CommentGetById, CommentReadMany, DEFAULT_PAGE,
    RepliesByParent,
};
pub use like::{Like, LikeGetByIds, LikeStatus, LikeToggle, LikesByComment};
pub use user::{
    DEFAULT_AVATAR, Provider, User, UserCreate, UserDelete, UserGetById, UserResolveIdentity,
    UserUpdate,
};

mod comment;
mod like;
mod user;
