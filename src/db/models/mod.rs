//! Database Models

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{ItemRequest, Order, OrderItem, OrderView};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use session::SessionRecord;
pub use user::{User, UserCreate, UserUpdate};
