mod todo_dto;

pub use todo_dto::{
    CategoryBriefDto, CreateTodoDto, ListTodosQuery, TodoDetailResponseDto, TodoListResponseDto,
    TodoMessageResponseDto, TodoResponseDto, UpdateTodoDto, UserBriefDto,
};
