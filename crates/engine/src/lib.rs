pub use approval::ApprovalStatus;
pub use budgets::{Budget, BudgetStatus, Period};
pub use categories::{Category, CategoryState};
pub use error::EngineError;
pub use expenses::{Approval, Expense, Frequency, PaymentMethod};
pub use notification_messages::{Message, Sender};
pub use notifications::{Notification, NotificationKind};
pub use ops::{Engine, EngineBuilder, Identity, Role};

mod approval;
pub mod budgets;
pub mod categories;
mod error;
pub mod expenses;
pub mod notification_messages;
pub mod notifications;
mod ops;
pub mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
