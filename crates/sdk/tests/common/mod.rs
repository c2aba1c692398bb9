#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_types::{
    Balance, Cursors, PaginatedResponse, Paging,
    aggregation::{
        AccountResponse, AccountStatus, AccountType, AccountUpdateRequest, BudgetCategory,
        CategoryType, MerchantResponse, MerchantType, TransactionBaseType,
        TransactionCategoryResponse, TransactionListQuery, TransactionResponse, TransactionStatus,
    },
    bills::{
        BillCreateRequest, BillFrequency, BillPaymentListQuery, BillPaymentRequestStatus,
        BillPaymentResponse, BillPaymentStatus, BillPaymentUpdateRequest, BillResponse, BillStatus,
        BillType, BillUpdateRequest,
    },
    budgets::{
        BudgetCreateRequest, BudgetFrequency, BudgetListQuery, BudgetPeriodListQuery,
        BudgetPeriodResponse, BudgetResponse, BudgetStatus, BudgetTrackingStatus, BudgetType,
        BudgetUpdateRequest,
    },
    contacts::{ContactListQuery, ContactRequest, ContactResponse, PaymentDetails},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use frollo_sdk::{
    AggregationApi, ApiError, ApiResult, BillsApi, BudgetsApi, ContactsApi, Frollo, Store,
};

/// Canned server state shared by every endpoint of [`MockApi`].
#[derive(Default)]
pub struct MockState {
    pub accounts: Vec<AccountResponse>,
    pub merchants: Vec<MerchantResponse>,
    pub categories: Vec<TransactionCategoryResponse>,
    pub transactions: Vec<TransactionResponse>,
    pub transaction_cursors: Cursors,
    pub bills: Vec<BillResponse>,
    pub bill_payments: Vec<BillPaymentResponse>,
    pub budgets: Vec<BudgetResponse>,
    pub budget_periods: Vec<BudgetPeriodResponse>,
    pub contacts: Vec<ContactResponse>,
    pub contact_cursors: Cursors,
    /// Every request fails with this server error while set.
    pub failure: Option<String>,
    pub merchant_delay: Option<Duration>,
    pub calls: Vec<String>,
}

#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with(&self, update: impl FnOnce(&mut MockState)) {
        update(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(':').next() == Some(endpoint))
            .count()
    }

    fn call(&self, name: String) -> ApiResult<std::sync::MutexGuard<'_, MockState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(name);
        match &state.failure {
            Some(message) => Err(ApiError::Server(message.clone())),
            None => Ok(state),
        }
    }
}

fn find<T: Clone>(items: &[T], id: i64, id_of: impl Fn(&T) -> i64) -> ApiResult<T> {
    items
        .iter()
        .find(|item| id_of(item) == id)
        .cloned()
        .ok_or(ApiError::NotFound)
}

#[async_trait]
impl AggregationApi for MockApi {
    async fn fetch_accounts(&self) -> ApiResult<Vec<AccountResponse>> {
        Ok(self.call("fetch_accounts".to_string())?.accounts.clone())
    }

    async fn fetch_account(&self, account_id: i64) -> ApiResult<AccountResponse> {
        let state = self.call(format!("fetch_account:{account_id}"))?;
        find(&state.accounts, account_id, |a| a.id)
    }

    async fn update_account(
        &self,
        account_id: i64,
        request: &AccountUpdateRequest,
    ) -> ApiResult<AccountResponse> {
        let mut state = self.call(format!("update_account:{account_id}"))?;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or(ApiError::NotFound)?;
        account.nick_name = request.nick_name.clone();
        account.included = request.included;
        account.favourite = request.favourite;
        account.hidden = request.hidden;
        Ok(account.clone())
    }

    async fn fetch_merchants(&self, merchant_ids: &[i64]) -> ApiResult<Vec<MerchantResponse>> {
        let ids = merchant_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let (merchants, delay) = {
            let state = self.call(format!("fetch_merchants:{ids}"))?;
            let merchants = state
                .merchants
                .iter()
                .filter(|m| merchant_ids.contains(&m.id))
                .cloned()
                .collect::<Vec<_>>();
            (merchants, state.merchant_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(merchants)
    }

    async fn fetch_merchant(&self, merchant_id: i64) -> ApiResult<MerchantResponse> {
        let state = self.call(format!("fetch_merchant:{merchant_id}"))?;
        find(&state.merchants, merchant_id, |m| m.id)
    }

    async fn fetch_transaction_categories(&self) -> ApiResult<Vec<TransactionCategoryResponse>> {
        Ok(self
            .call("fetch_transaction_categories".to_string())?
            .categories
            .clone())
    }

    async fn fetch_transactions(
        &self,
        query: &TransactionListQuery,
    ) -> ApiResult<PaginatedResponse<TransactionResponse>> {
        let state = self.call(format!(
            "fetch_transactions:{}:{}",
            query.before.as_deref().unwrap_or("-"),
            query.after.as_deref().unwrap_or("-")
        ))?;
        Ok(PaginatedResponse {
            data: state.transactions.clone(),
            paging: Paging {
                cursors: state.transaction_cursors.clone(),
                total: None,
            },
        })
    }

    async fn fetch_transaction(&self, transaction_id: i64) -> ApiResult<TransactionResponse> {
        let state = self.call(format!("fetch_transaction:{transaction_id}"))?;
        find(&state.transactions, transaction_id, |t| t.id)
    }
}

#[async_trait]
impl BillsApi for MockApi {
    async fn fetch_bills(&self) -> ApiResult<Vec<BillResponse>> {
        Ok(self.call("fetch_bills".to_string())?.bills.clone())
    }

    async fn fetch_bill(&self, bill_id: i64) -> ApiResult<BillResponse> {
        let state = self.call(format!("fetch_bill:{bill_id}"))?;
        find(&state.bills, bill_id, |b| b.id)
    }

    async fn create_bill(&self, request: &BillCreateRequest) -> ApiResult<BillResponse> {
        let mut state = self.call("create_bill".to_string())?;
        let id = 900 + state.bills.len() as i64;
        let mut created = bill(id, request.account_id);
        created.name = request.name.clone().unwrap_or_else(|| "From transaction".to_string());
        created.frequency = request.frequency;
        created.next_payment_date = request.next_payment_date;
        created.notes = request.notes.clone();
        if let Some(due_amount) = &request.due_amount {
            created.due_amount = due_amount.clone();
        }
        state.bills.push(created.clone());
        Ok(created)
    }

    async fn update_bill(
        &self,
        bill_id: i64,
        request: &BillUpdateRequest,
    ) -> ApiResult<BillResponse> {
        let mut state = self.call(format!("update_bill:{bill_id}"))?;
        let bill = state
            .bills
            .iter_mut()
            .find(|b| b.id == bill_id)
            .ok_or(ApiError::NotFound)?;
        bill.name = request.name.clone();
        bill.bill_type = request.bill_type;
        bill.status = request.status;
        bill.frequency = request.frequency;
        bill.due_amount = request.due_amount.clone();
        bill.next_payment_date = request.next_payment_date;
        bill.notes = request.notes.clone();
        Ok(bill.clone())
    }

    async fn delete_bill(&self, bill_id: i64) -> ApiResult<()> {
        let mut state = self.call(format!("delete_bill:{bill_id}"))?;
        state.bills.retain(|b| b.id != bill_id);
        Ok(())
    }

    async fn fetch_bill_payments(
        &self,
        query: &BillPaymentListQuery,
    ) -> ApiResult<Vec<BillPaymentResponse>> {
        let state = self.call(format!(
            "fetch_bill_payments:{}:{}",
            query.from_date, query.to_date
        ))?;
        Ok(state
            .bill_payments
            .iter()
            .filter(|p| p.date >= query.from_date && p.date <= query.to_date)
            .cloned()
            .collect())
    }

    async fn update_bill_payment(
        &self,
        bill_payment_id: i64,
        request: &BillPaymentUpdateRequest,
    ) -> ApiResult<BillPaymentResponse> {
        let mut state = self.call(format!("update_bill_payment:{bill_payment_id}"))?;
        let payment = state
            .bill_payments
            .iter_mut()
            .find(|p| p.id == bill_payment_id)
            .ok_or(ApiError::NotFound)?;
        if let Some(date) = request.date {
            payment.date = date;
        }
        payment.payment_status = match request.status {
            Some(BillPaymentRequestStatus::Paid) => BillPaymentStatus::Paid,
            _ => BillPaymentStatus::Due,
        };
        Ok(payment.clone())
    }

    async fn delete_bill_payment(&self, bill_payment_id: i64) -> ApiResult<()> {
        let mut state = self.call(format!("delete_bill_payment:{bill_payment_id}"))?;
        state.bill_payments.retain(|p| p.id != bill_payment_id);
        Ok(())
    }
}

#[async_trait]
impl BudgetsApi for MockApi {
    async fn fetch_budgets(&self, query: &BudgetListQuery) -> ApiResult<Vec<BudgetResponse>> {
        let state = self.call("fetch_budgets".to_string())?;
        Ok(state
            .budgets
            .iter()
            .filter(|b| query.current.is_none_or(|current| b.is_current == current))
            .filter(|b| query.category_type.is_none_or(|t| b.budget_type == t))
            .cloned()
            .collect())
    }

    async fn fetch_budget(&self, budget_id: i64) -> ApiResult<BudgetResponse> {
        let state = self.call(format!("fetch_budget:{budget_id}"))?;
        find(&state.budgets, budget_id, |b| b.id)
    }

    async fn create_budget(&self, request: &BudgetCreateRequest) -> ApiResult<BudgetResponse> {
        let mut state = self.call("create_budget".to_string())?;
        let mut created = budget(700 + state.budgets.len() as i64, true);
        created.budget_type = request.budget_type;
        created.type_value = request.type_value.clone();
        created.frequency = request.frequency;
        created.period_amount = request.period_amount.clone();
        created.target_amount = request.target_amount.clone();
        created.start_date = request.start_date;
        created.image_url = request.image_url.clone();
        state.budgets.push(created.clone());
        Ok(created)
    }

    async fn update_budget(
        &self,
        budget_id: i64,
        request: &BudgetUpdateRequest,
    ) -> ApiResult<BudgetResponse> {
        let mut state = self.call(format!("update_budget:{budget_id}"))?;
        let budget = state
            .budgets
            .iter_mut()
            .find(|b| b.id == budget_id)
            .ok_or(ApiError::NotFound)?;
        budget.period_amount = request.period_amount.clone();
        budget.target_amount = request.target_amount.clone();
        budget.image_url = request.image_url.clone();
        Ok(budget.clone())
    }

    async fn delete_budget(&self, budget_id: i64) -> ApiResult<()> {
        let mut state = self.call(format!("delete_budget:{budget_id}"))?;
        state.budgets.retain(|b| b.id != budget_id);
        Ok(())
    }

    async fn fetch_budget_periods(
        &self,
        budget_id: i64,
        query: &BudgetPeriodListQuery,
    ) -> ApiResult<Vec<BudgetPeriodResponse>> {
        let state = self.call(format!("fetch_budget_periods:{budget_id}"))?;
        Ok(state
            .budget_periods
            .iter()
            .filter(|p| p.budget_id == budget_id)
            .filter(|p| query.from_date.is_none_or(|from| p.start_date >= from))
            .filter(|p| query.to_date.is_none_or(|to| p.end_date <= to))
            .cloned()
            .collect())
    }

    async fn fetch_budget_period(
        &self,
        budget_id: i64,
        period_id: i64,
    ) -> ApiResult<BudgetPeriodResponse> {
        let state = self.call(format!("fetch_budget_period:{budget_id}:{period_id}"))?;
        find(&state.budget_periods, period_id, |p| p.id)
    }
}

#[async_trait]
impl ContactsApi for MockApi {
    async fn fetch_contacts(
        &self,
        query: &ContactListQuery,
    ) -> ApiResult<PaginatedResponse<ContactResponse>> {
        let state = self.call(format!(
            "fetch_contacts:{}:{}",
            query.before.as_deref().unwrap_or("-"),
            query.after.as_deref().unwrap_or("-")
        ))?;
        Ok(PaginatedResponse {
            data: state.contacts.clone(),
            paging: Paging {
                cursors: state.contact_cursors.clone(),
                total: None,
            },
        })
    }

    async fn fetch_contact(&self, contact_id: i64) -> ApiResult<ContactResponse> {
        let state = self.call(format!("fetch_contact:{contact_id}"))?;
        find(&state.contacts, contact_id, |c| c.id)
    }

    async fn create_contact(&self, request: &ContactRequest) -> ApiResult<ContactResponse> {
        let mut state = self.call("create_contact".to_string())?;
        let mut created = contact(500 + state.contacts.len() as i64, request.details.clone());
        created.name = request
            .name
            .clone()
            .unwrap_or_else(|| request.nick_name.clone());
        created.nick_name = Some(request.nick_name.clone());
        created.description = request.description.clone();
        state.contacts.push(created.clone());
        Ok(created)
    }

    async fn update_contact(
        &self,
        contact_id: i64,
        request: &ContactRequest,
    ) -> ApiResult<ContactResponse> {
        let mut state = self.call(format!("update_contact:{contact_id}"))?;
        let contact = state
            .contacts
            .iter_mut()
            .find(|c| c.id == contact_id)
            .ok_or(ApiError::NotFound)?;
        if let Some(name) = &request.name {
            contact.name = name.clone();
        }
        contact.nick_name = Some(request.nick_name.clone());
        contact.description = request.description.clone();
        contact.details = request.details.clone();
        Ok(contact.clone())
    }

    async fn delete_contact(&self, contact_id: i64) -> ApiResult<()> {
        let mut state = self.call(format!("delete_contact:{contact_id}"))?;
        state.contacts.retain(|c| c.id != contact_id);
        Ok(())
    }
}

pub async fn sdk(api: Arc<MockApi>) -> Frollo {
    let store = Store::open("sqlite::memory:").await.unwrap();
    Frollo::builder().store(store).api(api).build().await.unwrap()
}

/// Poll `condition` until it holds or two seconds have passed.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn account(id: i64) -> AccountResponse {
    AccountResponse {
        id,
        account_name: format!("Account {id}"),
        nick_name: None,
        account_type: AccountType::Bank,
        account_status: AccountStatus::Active,
        provider_name: "Demo Bank".to_string(),
        current_balance: Some(Balance {
            amount: "1250.00".to_string(),
            currency: "AUD".to_string(),
        }),
        included: true,
        favourite: false,
        hidden: false,
    }
}

pub fn merchant(id: i64) -> MerchantResponse {
    MerchantResponse {
        id,
        name: format!("Merchant {id}"),
        merchant_type: MerchantType::Retailer,
        small_logo_url: None,
    }
}

pub fn category(id: i64) -> TransactionCategoryResponse {
    TransactionCategoryResponse {
        id,
        name: format!("Category {id}"),
        category_type: CategoryType::Expense,
        default_budget_category: BudgetCategory::Living,
        icon_url: None,
    }
}

pub fn transaction(id: i64, account_id: i64, on: NaiveDate) -> TransactionResponse {
    TransactionResponse {
        id,
        account_id,
        merchant_id: None,
        category_id: None,
        transaction_date: on,
        amount: Balance {
            amount: "-12.50".to_string(),
            currency: "AUD".to_string(),
        },
        description: format!("Transaction {id}"),
        status: TransactionStatus::Posted,
        base_type: TransactionBaseType::Debit,
        budget_category: BudgetCategory::Living,
        included: true,
    }
}

pub fn bill(id: i64, account_id: Option<i64>) -> BillResponse {
    BillResponse {
        id,
        name: format!("Bill {id}"),
        description: None,
        bill_type: BillType::Bill,
        status: BillStatus::Confirmed,
        frequency: BillFrequency::Monthly,
        payment_status: BillPaymentStatus::Due,
        next_payment_date: date(2026, 11, 1),
        next_payment_amount: "80.00".to_string(),
        due_amount: "80.00".to_string(),
        average_amount: "80.00".to_string(),
        last_payment_date: None,
        notes: None,
        account_id,
        merchant_id: None,
        category_id: None,
    }
}

pub fn bill_payment(id: i64, bill_id: i64, on: NaiveDate) -> BillPaymentResponse {
    BillPaymentResponse {
        id,
        bill_id,
        name: format!("Payment {id}"),
        date: on,
        payment_status: BillPaymentStatus::Due,
        frequency: BillFrequency::Monthly,
        bill_type: BillType::Bill,
        amount: "80.00".to_string(),
        unpayable: false,
    }
}

pub fn budget(id: i64, is_current: bool) -> BudgetResponse {
    BudgetResponse {
        id,
        budget_type: BudgetType::BudgetCategory,
        type_value: "living".to_string(),
        frequency: BudgetFrequency::Monthly,
        status: BudgetStatus::Active,
        is_current,
        current_amount: "120.00".to_string(),
        target_amount: Some("500.00".to_string()),
        period_amount: "500.00".to_string(),
        start_date: Some(date(2026, 1, 1)),
        tracking_status: BudgetTrackingStatus::Below,
        image_url: None,
    }
}

pub fn budget_period(id: i64, budget_id: i64, start: NaiveDate) -> BudgetPeriodResponse {
    BudgetPeriodResponse {
        id,
        budget_id,
        start_date: start,
        end_date: start + chrono::Days::new(27),
        current_amount: "40.00".to_string(),
        target_amount: "500.00".to_string(),
        required_amount: "460.00".to_string(),
        tracking_status: BudgetTrackingStatus::Below,
        index: id,
    }
}

pub fn contact(id: i64, details: PaymentDetails) -> ContactResponse {
    ContactResponse {
        id,
        name: format!("Contact {id}"),
        nick_name: Some(format!("Nick {id}")),
        description: None,
        verified: false,
        related_provider_account_ids: Vec::new(),
        details,
    }
}

pub fn pay_anyone(account_number: &str) -> PaymentDetails {
    PaymentDetails::PayAnyone {
        account_holder: "J Citizen".to_string(),
        bsb: "100-123".to_string(),
        account_number: account_number.to_string(),
    }
}

pub fn cursors(before: Option<&str>, after: Option<&str>) -> Cursors {
    Cursors {
        before: before.map(ToString::to_string),
        after: after.map(ToString::to_string),
    }
}
