//! Service layer for Upkeep
//!
//! The service layer provides business logic on top of the storage layer:
//! validation, ownership scoping, audit logging and cross-entity operations.

pub mod category;
pub mod expense;
pub mod import;
pub mod payment;
pub mod user;

pub use category::CategoryService;
pub use expense::{CreateExpenseInput, ExpenseFilter, ExpenseService, UpdateExpenseInput};
pub use import::{parse_document, ImportDocument, ImportService, ImportSummary};
pub use payment::{PaymentService, RecordPaymentInput};
pub use user::{UserDeletion, UserService};
