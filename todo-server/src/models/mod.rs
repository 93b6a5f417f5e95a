//! Domain models with validation at construction
//!
//! Client input is decoded into request types and then validated into
//! types the repository accepts. Invalid input returns ValidationError,
//! never a panic.

pub mod todo;
pub mod validation;

pub use todo::{CreateTodoRequest, NewTodo, Todo, TodoMessage};
pub use validation::ValidationError;
