pub mod connectivity_dto;
