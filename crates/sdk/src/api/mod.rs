//! Network service contracts, one trait per API area.
//!
//! Managers only talk to the server through these traits so tests can swap
//! in an in-memory implementation.

use api_types::{
    PaginatedResponse,
    aggregation::{
        AccountResponse, AccountUpdateRequest, MerchantResponse, TransactionCategoryResponse,
        TransactionListQuery, TransactionResponse,
    },
    bills::{
        BillCreateRequest, BillPaymentListQuery, BillPaymentResponse, BillPaymentUpdateRequest,
        BillResponse, BillUpdateRequest,
    },
    budgets::{
        BudgetCreateRequest, BudgetListQuery, BudgetPeriodListQuery, BudgetPeriodResponse,
        BudgetResponse, BudgetUpdateRequest,
    },
    contacts::{ContactListQuery, ContactRequest, ContactResponse},
};
use async_trait::async_trait;

use crate::ApiError;

mod http;

pub use http::HttpService;

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait AggregationApi: Send + Sync {
    async fn fetch_accounts(&self) -> ApiResult<Vec<AccountResponse>>;
    async fn fetch_account(&self, account_id: i64) -> ApiResult<AccountResponse>;
    async fn update_account(
        &self,
        account_id: i64,
        request: &AccountUpdateRequest,
    ) -> ApiResult<AccountResponse>;

    async fn fetch_merchants(&self, merchant_ids: &[i64]) -> ApiResult<Vec<MerchantResponse>>;
    async fn fetch_merchant(&self, merchant_id: i64) -> ApiResult<MerchantResponse>;

    async fn fetch_transaction_categories(&self) -> ApiResult<Vec<TransactionCategoryResponse>>;

    async fn fetch_transactions(
        &self,
        query: &TransactionListQuery,
    ) -> ApiResult<PaginatedResponse<TransactionResponse>>;
    async fn fetch_transaction(&self, transaction_id: i64) -> ApiResult<TransactionResponse>;
}

#[async_trait]
pub trait BillsApi: Send + Sync {
    async fn fetch_bills(&self) -> ApiResult<Vec<BillResponse>>;
    async fn fetch_bill(&self, bill_id: i64) -> ApiResult<BillResponse>;
    async fn create_bill(&self, request: &BillCreateRequest) -> ApiResult<BillResponse>;
    async fn update_bill(&self, bill_id: i64, request: &BillUpdateRequest)
    -> ApiResult<BillResponse>;
    async fn delete_bill(&self, bill_id: i64) -> ApiResult<()>;

    async fn fetch_bill_payments(
        &self,
        query: &BillPaymentListQuery,
    ) -> ApiResult<Vec<BillPaymentResponse>>;
    async fn update_bill_payment(
        &self,
        bill_payment_id: i64,
        request: &BillPaymentUpdateRequest,
    ) -> ApiResult<BillPaymentResponse>;
    async fn delete_bill_payment(&self, bill_payment_id: i64) -> ApiResult<()>;
}

#[async_trait]
pub trait BudgetsApi: Send + Sync {
    async fn fetch_budgets(&self, query: &BudgetListQuery) -> ApiResult<Vec<BudgetResponse>>;
    async fn fetch_budget(&self, budget_id: i64) -> ApiResult<BudgetResponse>;
    async fn create_budget(&self, request: &BudgetCreateRequest) -> ApiResult<BudgetResponse>;
    async fn update_budget(
        &self,
        budget_id: i64,
        request: &BudgetUpdateRequest,
    ) -> ApiResult<BudgetResponse>;
    async fn delete_budget(&self, budget_id: i64) -> ApiResult<()>;

    async fn fetch_budget_periods(
        &self,
        budget_id: i64,
        query: &BudgetPeriodListQuery,
    ) -> ApiResult<Vec<BudgetPeriodResponse>>;
    async fn fetch_budget_period(
        &self,
        budget_id: i64,
        period_id: i64,
    ) -> ApiResult<BudgetPeriodResponse>;
}

#[async_trait]
pub trait ContactsApi: Send + Sync {
    async fn fetch_contacts(
        &self,
        query: &ContactListQuery,
    ) -> ApiResult<PaginatedResponse<ContactResponse>>;
    async fn fetch_contact(&self, contact_id: i64) -> ApiResult<ContactResponse>;
    async fn create_contact(&self, request: &ContactRequest) -> ApiResult<ContactResponse>;
    async fn update_contact(
        &self,
        contact_id: i64,
        request: &ContactRequest,
    ) -> ApiResult<ContactResponse>;
    async fn delete_contact(&self, contact_id: i64) -> ApiResult<()>;
}

/// Every API area. Implemented for any type that provides all of them.
pub trait FrolloApi: AggregationApi + BillsApi + BudgetsApi + ContactsApi {}

impl<T> FrolloApi for T where T: AggregationApi + BillsApi + BudgetsApi + ContactsApi {}
