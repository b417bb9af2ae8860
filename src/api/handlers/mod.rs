pub mod health;
pub mod page;

pub use self::health::health;
pub use self::page::page;
