pub mod health;
pub mod get;
pub mod list;

pub use health::health_handler;
pub use get::get_handler;
pub use list::list_handler;
