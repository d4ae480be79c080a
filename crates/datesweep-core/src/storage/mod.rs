mod attachment_repo;
mod comment_repo;
mod database;
mod session_repo;
mod user_repo;

pub use attachment_repo::AttachmentRepository;
pub use comment_repo::CommentRepository;
pub use database::Database;
pub use session_repo::SessionRepository;
pub use user_repo::UserRepository;
