pub mod auth_handler;

pub use auth_handler::{
    __path_get_profile, __path_login, __path_register, get_profile, login, register,
};
