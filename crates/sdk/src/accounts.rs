//! Cached financial accounts.

use api_types::{
    Balance,
    aggregation::{AccountResponse, AccountStatus, AccountType},
};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{
    ResultEngine,
    cache::{CachedObject, LinkPath},
    locks::EntityKind,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub account_name: String,
    pub nick_name: Option<String>,
    pub account_type: String,
    pub account_status: String,
    pub provider_name: String,
    pub balance_amount: Option<String>,
    pub balance_currency: Option<String>,
    pub included: bool,
    pub favourite: bool,
    pub hidden: bool,
}

impl Model {
    pub fn account_type(&self) -> ResultEngine<AccountType> {
        Ok(AccountType::try_from(self.account_type.as_str())?)
    }

    pub fn account_status(&self) -> ResultEngine<AccountStatus> {
        Ok(AccountStatus::try_from(self.account_status.as_str())?)
    }

    pub fn current_balance(&self) -> Option<Balance> {
        match (&self.balance_amount, &self.balance_currency) {
            (Some(amount), Some(currency)) => Some(Balance {
                amount: amount.clone(),
                currency: currency.clone(),
            }),
            _ => None,
        }
    }

    /// Nickname if set, the provider's account name otherwise.
    pub fn display_name(&self) -> &str {
        self.nick_name.as_deref().unwrap_or(&self.account_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::bills::Entity")]
    Bills,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl CachedObject for Entity {
    const KIND: EntityKind = EntityKind::Accounts;
    const LINKS: &'static [LinkPath<Self>] = &[];

    type Active = ActiveModel;
    type Response = AccountResponse;

    fn id_column() -> Column {
        Column::Id
    }

    fn response_id(response: &AccountResponse) -> i64 {
        response.id
    }

    fn active_model(response: &AccountResponse) -> ResultEngine<ActiveModel> {
        let balance = response.current_balance.as_ref();
        Ok(ActiveModel {
            id: ActiveValue::Set(response.id),
            account_name: ActiveValue::Set(response.account_name.clone()),
            nick_name: ActiveValue::Set(response.nick_name.clone()),
            account_type: ActiveValue::Set(response.account_type.as_str().to_string()),
            account_status: ActiveValue::Set(response.account_status.as_str().to_string()),
            provider_name: ActiveValue::Set(response.provider_name.clone()),
            balance_amount: ActiveValue::Set(balance.map(|b| b.amount.clone())),
            balance_currency: ActiveValue::Set(balance.map(|b| b.currency.clone())),
            included: ActiveValue::Set(response.included),
            favourite: ActiveValue::Set(response.favourite),
            hidden: ActiveValue::Set(response.hidden),
        })
    }
}
