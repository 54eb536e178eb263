#[doc(hidden)]
pub mod full;
mod manager;
#[doc(hidden)]
pub mod progress;
#[doc(hidden)]
pub mod scanner;

pub use manager::MongoCloner;
pub use scanner::Inventory;
