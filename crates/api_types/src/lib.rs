//! Wire types exchanged with the Frollo REST API.
//!
//! Dates travel as `yyyy-MM-dd` strings and amounts as decimal strings, so
//! nothing here performs arithmetic on money.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a stored or received raw value does not name a known variant.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a snake_case wire enum together with its canonical raw string.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $raw:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $raw)]
                $variant,
            )+
        }

        impl $name {
            /// Returns the raw value used on the wire and in the cache.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $raw,)+
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = UnknownVariant;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value {
                    $($raw => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Cursor envelope shared by paginated list endpoints.
///
/// Cursors are opaque: the SDK hands them back to the server unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    pub before: Option<String>,
    pub after: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub cursors: Cursors,
    pub total: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Paging,
}

/// A monetary value as sent by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub amount: String,
    pub currency: String,
}

pub mod aggregation {
    use super::*;

    wire_enum!(AccountType {
        Bank => "bank",
        Savings => "savings",
        CreditCard => "credit_card",
        SuperAnnuation => "super_annuation",
        Investment => "investment",
        Loan => "loan",
        Mortgage => "mortgage",
        Insurance => "insurance",
        Rewards => "rewards",
        Other => "other",
    });

    wire_enum!(AccountStatus {
        Active => "active",
        Inactive => "inactive",
        Closed => "closed",
    });

    wire_enum!(MerchantType {
        Retailer => "retailer",
        Transactional => "transactional",
        Unknown => "unknown",
    });

    wire_enum!(CategoryType {
        Income => "income",
        Expense => "expense",
        Transfer => "transfer",
        Deferred => "deferred",
        Unknown => "unknown",
    });

    wire_enum!(TransactionStatus {
        Pending => "pending",
        Posted => "posted",
        Scheduled => "scheduled",
    });

    wire_enum!(TransactionBaseType {
        Credit => "credit",
        Debit => "debit",
        Other => "other",
        Unknown => "unknown",
    });

    wire_enum!(BudgetCategory {
        Income => "income",
        Living => "living",
        Lifestyle => "lifestyle",
        Savings => "goals",
        OneOff => "one_off",
    });

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AccountResponse {
        pub id: i64,
        pub account_name: String,
        pub nick_name: Option<String>,
        pub account_type: AccountType,
        pub account_status: AccountStatus,
        pub provider_name: String,
        pub current_balance: Option<Balance>,
        #[serde(default)]
        pub included: bool,
        #[serde(default)]
        pub favourite: bool,
        #[serde(default)]
        pub hidden: bool,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdateRequest {
        pub nick_name: Option<String>,
        pub included: bool,
        pub favourite: bool,
        pub hidden: bool,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct MerchantResponse {
        pub id: i64,
        pub name: String,
        pub merchant_type: MerchantType,
        pub small_logo_url: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TransactionCategoryResponse {
        pub id: i64,
        pub name: String,
        pub category_type: CategoryType,
        pub default_budget_category: BudgetCategory,
        pub icon_url: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TransactionResponse {
        pub id: i64,
        pub account_id: i64,
        pub merchant_id: Option<i64>,
        pub category_id: Option<i64>,
        pub transaction_date: NaiveDate,
        pub amount: Balance,
        pub description: String,
        pub status: TransactionStatus,
        pub base_type: TransactionBaseType,
        pub budget_category: BudgetCategory,
        #[serde(default)]
        pub included: bool,
    }

    /// Query string for `GET aggregation/transactions`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub from_date: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub to_date: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub before: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub after: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub size: Option<i64>,
    }
}

pub mod bills {
    use super::*;

    wire_enum!(BillFrequency {
        Weekly => "weekly",
        Fortnightly => "fortnightly",
        FourWeekly => "four_weekly",
        Monthly => "monthly",
        Bimonthly => "bimonthly",
        Quarterly => "quarterly",
        Biannually => "biannually",
        Annually => "annually",
        Irregular => "irregular",
        Unknown => "unknown",
    });

    wire_enum!(BillStatus {
        Confirmed => "confirmed",
        Estimated => "estimated",
        Ignored => "ignored",
        Unconfirmed => "unconfirmed",
    });

    wire_enum!(BillType {
        Bill => "bill",
        Manual => "manual",
        Repayment => "repayment",
        Subscription => "subscription",
    });

    wire_enum!(BillPaymentStatus {
        Due => "due",
        Future => "future",
        Overdue => "overdue",
        Paid => "paid",
    });

    wire_enum!(
        /// Status a client may set on a single bill payment.
        BillPaymentRequestStatus {
            Paid => "paid",
            Unpaid => "unpaid",
        }
    );

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BillResponse {
        pub id: i64,
        pub name: String,
        pub description: Option<String>,
        pub bill_type: BillType,
        pub status: BillStatus,
        pub frequency: BillFrequency,
        pub payment_status: BillPaymentStatus,
        pub next_payment_date: NaiveDate,
        pub next_payment_amount: String,
        pub due_amount: String,
        pub average_amount: String,
        pub last_payment_date: Option<NaiveDate>,
        pub notes: Option<String>,
        pub account_id: Option<i64>,
        pub merchant_id: Option<i64>,
        pub category_id: Option<i64>,
    }

    /// Body of `POST bills`.
    ///
    /// A bill is either created manually (`account_id`, `due_amount`, `name`)
    /// or derived from an existing transaction (`transaction_id`).
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BillCreateRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub account_id: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub transaction_id: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub due_amount: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        pub frequency: BillFrequency,
        pub next_payment_date: NaiveDate,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub notes: Option<String>,
    }

    /// Body of `PUT bills/{id}`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BillUpdateRequest {
        pub name: String,
        pub bill_type: BillType,
        pub status: BillStatus,
        pub frequency: BillFrequency,
        pub due_amount: String,
        pub next_payment_date: NaiveDate,
        pub notes: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BillPaymentResponse {
        pub id: i64,
        pub bill_id: i64,
        pub name: String,
        pub date: NaiveDate,
        pub payment_status: BillPaymentStatus,
        pub frequency: BillFrequency,
        pub bill_type: BillType,
        pub amount: String,
        #[serde(default)]
        pub unpayable: bool,
    }

    /// Body of `PUT bills/payments/{id}`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct BillPaymentUpdateRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<BillPaymentRequestStatus>,
    }

    /// Query string for `GET bills/payments`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BillPaymentListQuery {
        pub from_date: NaiveDate,
        pub to_date: NaiveDate,
    }
}

pub mod budgets {
    use super::*;

    wire_enum!(BudgetType {
        BudgetCategory => "budget_category",
        Category => "category",
        Merchant => "merchant",
    });

    wire_enum!(BudgetFrequency {
        Daily => "daily",
        Weekly => "weekly",
        Fortnightly => "fortnightly",
        FourWeekly => "four_weekly",
        Monthly => "monthly",
        Quarterly => "quarterly",
        Biannually => "biannually",
        Annually => "annually",
    });

    wire_enum!(BudgetStatus {
        Unstarted => "unstarted",
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    });

    wire_enum!(BudgetTrackingStatus {
        Above => "above",
        Below => "below",
        Equal => "equal",
    });

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetResponse {
        pub id: i64,
        pub budget_type: BudgetType,
        /// Value the budget tracks: a budget category, category id or merchant id.
        pub type_value: String,
        pub frequency: BudgetFrequency,
        pub status: BudgetStatus,
        pub is_current: bool,
        pub current_amount: String,
        pub target_amount: Option<String>,
        pub period_amount: String,
        pub start_date: Option<NaiveDate>,
        pub tracking_status: BudgetTrackingStatus,
        pub image_url: Option<String>,
    }

    /// Body of `POST budgets`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetCreateRequest {
        pub budget_type: BudgetType,
        pub type_value: String,
        pub frequency: BudgetFrequency,
        pub period_amount: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub start_date: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub target_amount: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub image_url: Option<String>,
    }

    /// Body of `PUT budgets/{id}`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetUpdateRequest {
        pub period_amount: String,
        pub target_amount: Option<String>,
        pub image_url: Option<String>,
    }

    /// Query string for `GET budgets`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct BudgetListQuery {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub current: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub category_type: Option<BudgetType>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetPeriodResponse {
        pub id: i64,
        pub budget_id: i64,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub current_amount: String,
        pub target_amount: String,
        pub required_amount: String,
        pub tracking_status: BudgetTrackingStatus,
        pub index: i64,
    }

    /// Query string for `GET budgets/{id}/periods`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct BudgetPeriodListQuery {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub from_date: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub to_date: Option<NaiveDate>,
    }
}

pub mod contacts {
    use super::*;

    wire_enum!(PaymentMethod {
        PayAnyone => "pay_anyone",
        Bpay => "bpay",
        PayId => "pay_id",
        International => "international",
    });

    wire_enum!(PayIdType {
        Email => "email",
        Mobile => "telephone",
        Abn => "abn",
        OrganisationId => "organisation_id",
    });

    /// Payment details, discriminated by `payment_method`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(
        tag = "payment_method",
        content = "payment_details",
        rename_all = "snake_case"
    )]
    pub enum PaymentDetails {
        PayAnyone {
            account_holder: String,
            bsb: String,
            account_number: String,
        },
        Bpay {
            biller_code: String,
            crn: String,
            biller_name: String,
        },
        PayId {
            payid: String,
            name: String,
            id_type: PayIdType,
        },
        International {
            name: String,
            country: String,
            message: Option<String>,
            bank_country: String,
            account_number: String,
            bic: Option<String>,
            routing_number: Option<String>,
        },
    }

    impl PaymentDetails {
        pub fn method(&self) -> PaymentMethod {
            match self {
                Self::PayAnyone { .. } => PaymentMethod::PayAnyone,
                Self::Bpay { .. } => PaymentMethod::Bpay,
                Self::PayId { .. } => PaymentMethod::PayId,
                Self::International { .. } => PaymentMethod::International,
            }
        }
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ContactResponse {
        pub id: i64,
        pub name: String,
        pub nick_name: Option<String>,
        pub description: Option<String>,
        #[serde(default)]
        pub verified: bool,
        #[serde(default)]
        pub related_provider_account_ids: Vec<i64>,
        #[serde(flatten)]
        pub details: PaymentDetails,
    }

    /// Body of `POST contacts` and `PUT contacts/{id}`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ContactRequest {
        pub name: Option<String>,
        pub nick_name: String,
        pub description: Option<String>,
        #[serde(flatten)]
        pub details: PaymentDetails,
    }

    /// Query string for `GET contacts`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ContactListQuery {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub before: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub after: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub size: Option<i64>,
    }
}
