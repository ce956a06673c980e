//! Core data models for Upkeep
//!
//! Users, categories, recurring expenses and their payments, plus the value
//! types they are built from.

pub mod category;
pub mod entity;
pub mod expense;
pub mod frequency;
pub mod ids;
pub mod money;
pub mod payment;
pub mod recurrence;
pub mod user;

pub use category::Category;
pub use entity::Entity;
pub use expense::RecurringExpense;
pub use frequency::Frequency;
pub use ids::{CategoryId, ExpenseId, PaymentId, UserId};
pub use money::Money;
pub use payment::ExpensePayment;
pub use recurrence::{next_recurrence, next_recurrence_for_code};
pub use user::User;
