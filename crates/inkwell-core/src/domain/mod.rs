//! Domain entities - the core business objects.

mod page;
mod post;
mod user;

pub use page::{DEFAULT_PER_PAGE, MAX_PER_PAGE, Page, PageRequest};
pub use post::{NewPost, Post, TITLE_MAX_CHARS, validate_title};
pub use user::User;
