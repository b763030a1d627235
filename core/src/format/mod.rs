pub mod date;
pub mod text;
pub mod avatar;
pub mod remote;

pub use date::format_relative_date;
pub use text::{annotations, code_lenses, format_annotation, truncate, Annotation, CodeLens};
pub use avatar::{select_avatar, AvatarSource};
pub use remote::{commit_url, github_repo_url};
