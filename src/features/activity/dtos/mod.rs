mod activity_dto;

pub use activity_dto::ActivityResponseDto;
