//! HTTP router layer: purely structural request/response translation

pub mod blog;
pub mod health;
pub mod user;

pub use blog::{get_post, list_posts, BlogStore};
pub use health::hello;
pub use user::{register_account, sign_in, validate_session};
