mod todo;

pub use todo::TodoRecord;
