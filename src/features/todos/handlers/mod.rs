pub mod todo_handler;

pub use todo_handler::{
    __path_create_todo, __path_delete_todo, __path_get_todo, __path_list_todos,
    __path_toggle_todo, __path_update_todo, create_todo, delete_todo, get_todo, list_todos,
    toggle_todo, update_todo,
};
