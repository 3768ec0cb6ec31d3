// tukangin/src/model/mod.rs

//! Data structures for the entities the engine reads and writes.

pub mod order;
pub mod professional;
pub mod review;
pub mod voucher;
pub mod warranty;

use uuid::Uuid;

pub type OrderId = Uuid;
pub type UserId = Uuid;
pub type ProfessionalId = Uuid;
pub type VoucherId = Uuid;
pub type WarrantyId = Uuid;
pub type ReviewId = Uuid;

pub use order::{deposit_for, NewOrder, Order, OrderStatus, PaymentMethod, MAX_AMOUNT};
pub use professional::Professional;
pub use review::{NewReview, Review, MAX_RATING, MIN_RATING};
pub use voucher::{DiscountRule, Voucher};
pub use warranty::{ClaimStatus, NewWarranty, Warranty, WarrantyClaim, WarrantyStatus};
