// ABOUTME: User and app root entities referenced by the request aggregate
// ABOUTME: Provides CRUD storage for accounts and registered apps

pub mod storage;
pub mod types;


pub use storage::{AppStorage, UserStorage};
pub use types::*;
