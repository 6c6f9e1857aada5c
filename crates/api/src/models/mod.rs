//! Domain types served by the API.
//!
//! These are validated domain objects, separate from database row types.
//! Everything here serializes with the camelCase wire names the SPA expects.

pub mod cart;
pub mod category;
pub mod notification;
pub mod order;
pub mod product;
pub mod session;
pub mod user;
pub mod wishlist;

pub use cart::{Cart, CartItem};
pub use category::Category;
pub use notification::{NewNotification, Notification};
pub use order::{Order, OrderCustomer, OrderItem};
pub use product::{Product, ProductSummary, Review};
pub use user::{Address, CurrentUser, User};
pub use wishlist::Wishlist;
