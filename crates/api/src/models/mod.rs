//! Domain types returned by repositories and serialized in responses.
//!
//! These are validated domain objects separate from database row types.
//! JSON field names are camelCase; status enums keep their Spanish wire
//! values (see `cerveceria_core::types::status`).

pub mod cart;
pub mod order;
pub mod payment;
pub mod product;
pub mod review;
pub mod user;

pub use cart::{Cart, CartItem};
pub use order::{Order, OrderItem, OrderStats, StatusCount};
pub use payment::Payment;
pub use product::Product;
pub use review::Review;
pub use user::{Address, User};
