mod folder_dto;

pub use folder_dto::{CreateFolderDto, FolderResponseDto, UpdateFolderDto};
