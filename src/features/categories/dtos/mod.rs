mod category_dto;

pub use category_dto::{
    CategoryBodyDto, CategoryDetailResponseDto, CategoryListResponseDto,
    CategoryMessageResponseDto, CategoryResponseDto,
};
