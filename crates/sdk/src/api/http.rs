use std::time::Duration;

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
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{AggregationApi, ApiResult, BillsApi, BudgetsApi, ContactsApi};
use crate::{ApiError, EngineError, ResultEngine, settings};

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Query string for `GET aggregation/merchants`.
#[derive(Debug, Serialize)]
struct MerchantIdsQuery {
    merchant_ids: String,
}

/// REST client for the Frollo API.
#[derive(Debug, Clone)]
pub struct HttpService {
    base_url: Url,
    http: reqwest::Client,
    access_token: Option<String>,
}

impl HttpService {
    pub fn new(
        base_url: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> ResultEngine<Self> {
        // `Url::join` drops the last segment unless the base ends with '/'.
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&base_url)
            .map_err(|err| EngineError::Setup(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| EngineError::Setup(format!("http client: {err}")))?;

        Ok(Self {
            base_url,
            http,
            access_token,
        })
    }

    pub fn from_settings(api: &settings::Api) -> ResultEngine<Self> {
        Self::new(&api.base_url, api.access_token.clone(), api.timeout())
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|err| ApiError::Server(format!("invalid endpoint {path}: {err}")))?;

        let builder = self.http.request(method, endpoint);
        Ok(match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let res = builder.send().await.map_err(ApiError::Transport)?;
        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        tracing::debug!(status = status.as_u16(), %body, "request rejected");

        let err = match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            409 => ApiError::Conflict(body),
            422 => ApiError::Validation(body),
            _ => ApiError::Server(body),
        };
        Err(err)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let res = self.send(self.request(Method::GET, path)?).await?;
        res.json::<T>().await.map_err(ApiError::Transport)
    }

    async fn get_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ApiResult<T> {
        let res = self
            .send(self.request(Method::GET, path)?.query(query))
            .await?;
        res.json::<T>().await.map_err(ApiError::Transport)
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let res = self.send(self.request(method, path)?.json(body)).await?;
        res.json::<T>().await.map_err(ApiError::Transport)
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }
}

#[async_trait]
impl AggregationApi for HttpService {
    async fn fetch_accounts(&self) -> ApiResult<Vec<AccountResponse>> {
        self.get("aggregation/accounts").await
    }

    async fn fetch_account(&self, account_id: i64) -> ApiResult<AccountResponse> {
        self.get(&format!("aggregation/accounts/{account_id}")).await
    }

    async fn update_account(
        &self,
        account_id: i64,
        request: &AccountUpdateRequest,
    ) -> ApiResult<AccountResponse> {
        self.send_json(
            Method::PUT,
            &format!("aggregation/accounts/{account_id}"),
            request,
        )
        .await
    }

    async fn fetch_merchants(&self, merchant_ids: &[i64]) -> ApiResult<Vec<MerchantResponse>> {
        let query = MerchantIdsQuery {
            merchant_ids: merchant_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        };
        self.get_query("aggregation/merchants", &query).await
    }

    async fn fetch_merchant(&self, merchant_id: i64) -> ApiResult<MerchantResponse> {
        self.get(&format!("aggregation/merchants/{merchant_id}"))
            .await
    }

    async fn fetch_transaction_categories(&self) -> ApiResult<Vec<TransactionCategoryResponse>> {
        self.get("aggregation/transactions/categories").await
    }

    async fn fetch_transactions(
        &self,
        query: &TransactionListQuery,
    ) -> ApiResult<PaginatedResponse<TransactionResponse>> {
        self.get_query("aggregation/transactions", query).await
    }

    async fn fetch_transaction(&self, transaction_id: i64) -> ApiResult<TransactionResponse> {
        self.get(&format!("aggregation/transactions/{transaction_id}"))
            .await
    }
}

#[async_trait]
impl BillsApi for HttpService {
    async fn fetch_bills(&self) -> ApiResult<Vec<BillResponse>> {
        self.get("bills").await
    }

    async fn fetch_bill(&self, bill_id: i64) -> ApiResult<BillResponse> {
        self.get(&format!("bills/{bill_id}")).await
    }

    async fn create_bill(&self, request: &BillCreateRequest) -> ApiResult<BillResponse> {
        self.send_json(Method::POST, "bills", request).await
    }

    async fn update_bill(
        &self,
        bill_id: i64,
        request: &BillUpdateRequest,
    ) -> ApiResult<BillResponse> {
        self.send_json(Method::PUT, &format!("bills/{bill_id}"), request)
            .await
    }

    async fn delete_bill(&self, bill_id: i64) -> ApiResult<()> {
        self.delete(&format!("bills/{bill_id}")).await
    }

    async fn fetch_bill_payments(
        &self,
        query: &BillPaymentListQuery,
    ) -> ApiResult<Vec<BillPaymentResponse>> {
        self.get_query("bills/payments", query).await
    }

    async fn update_bill_payment(
        &self,
        bill_payment_id: i64,
        request: &BillPaymentUpdateRequest,
    ) -> ApiResult<BillPaymentResponse> {
        self.send_json(
            Method::PUT,
            &format!("bills/payments/{bill_payment_id}"),
            request,
        )
        .await
    }

    async fn delete_bill_payment(&self, bill_payment_id: i64) -> ApiResult<()> {
        self.delete(&format!("bills/payments/{bill_payment_id}"))
            .await
    }
}

#[async_trait]
impl BudgetsApi for HttpService {
    async fn fetch_budgets(&self, query: &BudgetListQuery) -> ApiResult<Vec<BudgetResponse>> {
        self.get_query("budgets", query).await
    }

    async fn fetch_budget(&self, budget_id: i64) -> ApiResult<BudgetResponse> {
        self.get(&format!("budgets/{budget_id}")).await
    }

    async fn create_budget(&self, request: &BudgetCreateRequest) -> ApiResult<BudgetResponse> {
        self.send_json(Method::POST, "budgets", request).await
    }

    async fn update_budget(
        &self,
        budget_id: i64,
        request: &BudgetUpdateRequest,
    ) -> ApiResult<BudgetResponse> {
        self.send_json(Method::PUT, &format!("budgets/{budget_id}"), request)
            .await
    }

    async fn delete_budget(&self, budget_id: i64) -> ApiResult<()> {
        self.delete(&format!("budgets/{budget_id}")).await
    }

    async fn fetch_budget_periods(
        &self,
        budget_id: i64,
        query: &BudgetPeriodListQuery,
    ) -> ApiResult<Vec<BudgetPeriodResponse>> {
        self.get_query(&format!("budgets/{budget_id}/periods"), query)
            .await
    }

    async fn fetch_budget_period(
        &self,
        budget_id: i64,
        period_id: i64,
    ) -> ApiResult<BudgetPeriodResponse> {
        self.get(&format!("budgets/{budget_id}/periods/{period_id}"))
            .await
    }
}

#[async_trait]
impl ContactsApi for HttpService {
    async fn fetch_contacts(
        &self,
        query: &ContactListQuery,
    ) -> ApiResult<PaginatedResponse<ContactResponse>> {
        self.get_query("contacts", query).await
    }

    async fn fetch_contact(&self, contact_id: i64) -> ApiResult<ContactResponse> {
        self.get(&format!("contacts/{contact_id}")).await
    }

    async fn create_contact(&self, request: &ContactRequest) -> ApiResult<ContactResponse> {
        self.send_json(Method::POST, "contacts", request).await
    }

    async fn update_contact(
        &self,
        contact_id: i64,
        request: &ContactRequest,
    ) -> ApiResult<ContactResponse> {
        self.send_json(Method::PUT, &format!("contacts/{contact_id}"), request)
            .await
    }

    async fn delete_contact(&self, contact_id: i64) -> ApiResult<()> {
        self.delete(&format!("contacts/{contact_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_a_trailing_slash() {
        let service = HttpService::new(
            "https://api.example.com/api/v2",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        let request = service
            .request(Method::GET, "bills/payments")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://api.example.com/api/v2/bills/payments"
        );
    }

    #[test]
    fn bearer_token_is_attached() {
        let service = HttpService::new(
            "https://api.example.com/",
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let request = service
            .request(Method::DELETE, "contacts/4")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.headers()["authorization"].to_str().unwrap(),
            "Bearer secret"
        );
    }

    #[test]
    fn invalid_base_url_is_a_setup_error() {
        assert!(matches!(
            HttpService::new("not a url", None, Duration::from_secs(5)),
            Err(EngineError::Setup(_))
        ));
    }
}
