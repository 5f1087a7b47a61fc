use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Deserializer for nullable patch fields: an absent field stays `None`,
/// an explicit `null` becomes `Some(None)` and clears the stored value.
fn patch_field<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Status of an approval request or sub-record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Requested,
    Approved,
    Denied,
}

pub mod category {
    use super::*;

    /// Lifecycle tag of a category.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryState {
        Active,
        Pending,
        Inactive,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
        pub color: String,
        pub icon: Option<String>,
        /// Optional note used in the companion approval thread when the
        /// caller is not an admin.
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub color: Option<String>,
        #[serde(default, deserialize_with = "super::patch_field")]
        pub icon: Option<Option<String>>,
    }

    /// Request body for the admin activate/deactivate endpoint.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryStateSet {
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub color: String,
        pub icon: Option<String>,
        pub state: CategoryState,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreated {
        pub id: Uuid,
        pub name: String,
        pub state: CategoryState,
        /// Id of the companion approval thread, when one was opened.
        pub notification_id: Option<Uuid>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentMethod {
        Cash,
        Card,
        BankTransfer,
        Mobile,
        Other,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Frequency {
        Daily,
        Weekly,
        Monthly,
        Yearly,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreate {
        pub category_id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        pub date: NaiveDate,
        pub payment_method: PaymentMethod,
        #[serde(default)]
        pub recurring: bool,
        pub frequency: Option<Frequency>,
        #[serde(default)]
        pub attachments: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub category_id: Option<Uuid>,
        pub amount_minor: Option<i64>,
        pub description: Option<String>,
        pub date: Option<NaiveDate>,
        pub payment_method: Option<PaymentMethod>,
        pub recurring: Option<bool>,
        #[serde(default, deserialize_with = "super::patch_field")]
        pub frequency: Option<Option<Frequency>>,
        pub attachments: Option<Vec<String>>,
    }

    /// Admin resolution of an expense approval sub-record.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseApprovalSet {
        pub status: ApprovalStatus,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub owner: String,
        pub category_id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        pub date: NaiveDate,
        pub payment_method: PaymentMethod,
        pub recurring: bool,
        pub frequency: Option<Frequency>,
        pub attachments: Vec<String>,
        pub approval_status: ApprovalStatus,
        pub approval_note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Period {
        Daily,
        Weekly,
        Monthly,
        Yearly,
    }

    /// Derived health of a budget.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetStatus {
        Good,
        Warning,
        Exceeded,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetCreate {
        pub name: String,
        pub amount_minor: i64,
        pub period: Period,
        pub category_id: Option<Uuid>,
        pub start_date: NaiveDate,
        pub threshold_pct: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub name: Option<String>,
        pub amount_minor: Option<i64>,
        pub period: Option<Period>,
        #[serde(default, deserialize_with = "super::patch_field")]
        pub category_id: Option<Option<Uuid>>,
        pub start_date: Option<NaiveDate>,
        pub active: Option<bool>,
        pub threshold_pct: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        pub spent_minor: i64,
        pub period: Period,
        pub category_id: Option<Uuid>,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub active: bool,
        pub threshold_pct: i32,
        pub status: BudgetStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetListResponse {
        pub budgets: Vec<BudgetView>,
    }
}

pub mod notification {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum NotificationKind {
        Category,
        Expense,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Sender {
        User,
        Admin,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationOpen {
        pub kind: NotificationKind,
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationReply {
        pub message: String,
    }

    /// Admin resolution of an approval thread.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationResolve {
        pub status: ApprovalStatus,
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageView {
        pub seq: i32,
        pub sender: Sender,
        pub body: String,
        pub sent_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationView {
        pub id: Uuid,
        pub owner: String,
        pub kind: NotificationKind,
        pub status: ApprovalStatus,
        pub created_at: DateTime<Utc>,
        pub messages: Vec<MessageView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NotificationListResponse {
        pub notifications: Vec<NotificationView>,
    }
}
