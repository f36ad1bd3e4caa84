mod listing;
mod user;

pub use listing::UserWithMeta;
pub use user::{Role, User};
