mod folder;

pub use folder::{Folder, FolderWithMeta};
