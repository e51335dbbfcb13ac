pub mod rows;
pub mod schema;
pub mod store;

pub use rows::GameColumn;
pub use store::{FilterOptions, GamePage, GameQuery, SortOrder, Store, StoreHandle};
