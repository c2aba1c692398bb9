//! Cached transactions.
//!
//! A transaction references its account, merchant and category. Each
//! reference is kept as sent by the server next to a `*_link` edge that is
//! only set once the parent is cached.

use api_types::{
    Balance,
    aggregation::{BudgetCategory, TransactionBaseType, TransactionResponse, TransactionStatus},
};
use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{
    ResultEngine,
    cache::{CachedObject, LinkPath},
    locks::EntityKind,
    util::{format_date, parse_date},
};

pub const ACCOUNT: LinkPath<Entity> = LinkPath {
    name: "account",
    reference: Column::AccountId,
    edge: Column::AccountLink,
};

pub const MERCHANT: LinkPath<Entity> = LinkPath {
    name: "merchant",
    reference: Column::MerchantId,
    edge: Column::MerchantLink,
};

pub const CATEGORY: LinkPath<Entity> = LinkPath {
    name: "category",
    reference: Column::CategoryId,
    edge: Column::CategoryLink,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub account_id: i64,
    pub account_link: Option<i64>,
    pub merchant_id: Option<i64>,
    pub merchant_link: Option<i64>,
    pub category_id: Option<i64>,
    pub category_link: Option<i64>,
    pub transaction_date: String,
    pub amount: String,
    pub currency: String,
    pub description: String,
    pub status: String,
    pub base_type: String,
    pub budget_category: String,
    pub included: bool,
}

impl Model {
    pub fn transaction_date(&self) -> ResultEngine<NaiveDate> {
        parse_date(&self.transaction_date, "transaction")
    }

    pub fn amount(&self) -> Balance {
        Balance {
            amount: self.amount.clone(),
            currency: self.currency.clone(),
        }
    }

    pub fn status(&self) -> ResultEngine<TransactionStatus> {
        Ok(TransactionStatus::try_from(self.status.as_str())?)
    }

    pub fn base_type(&self) -> ResultEngine<TransactionBaseType> {
        Ok(TransactionBaseType::try_from(self.base_type.as_str())?)
    }

    pub fn budget_category(&self) -> ResultEngine<BudgetCategory> {
        Ok(BudgetCategory::try_from(self.budget_category.as_str())?)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountLink",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::merchants::Entity",
        from = "Column::MerchantLink",
        to = "super::merchants::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Merchant,
    #[sea_orm(
        belongs_to = "super::transaction_categories::Entity",
        from = "Column::CategoryLink",
        to = "super::transaction_categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::merchants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Merchant.def()
    }
}

impl Related<super::transaction_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl CachedObject for Entity {
    const KIND: EntityKind = EntityKind::Transactions;
    const LINKS: &'static [LinkPath<Self>] = &[ACCOUNT, MERCHANT, CATEGORY];

    type Active = ActiveModel;
    type Response = TransactionResponse;

    fn id_column() -> Column {
        Column::Id
    }

    fn response_id(response: &TransactionResponse) -> i64 {
        response.id
    }

    fn active_model(response: &TransactionResponse) -> ResultEngine<ActiveModel> {
        Ok(ActiveModel {
            id: ActiveValue::Set(response.id),
            account_id: ActiveValue::Set(response.account_id),
            account_link: ActiveValue::NotSet,
            merchant_id: ActiveValue::Set(response.merchant_id),
            merchant_link: ActiveValue::NotSet,
            category_id: ActiveValue::Set(response.category_id),
            category_link: ActiveValue::NotSet,
            transaction_date: ActiveValue::Set(format_date(response.transaction_date)),
            amount: ActiveValue::Set(response.amount.amount.clone()),
            currency: ActiveValue::Set(response.amount.currency.clone()),
            description: ActiveValue::Set(response.description.clone()),
            status: ActiveValue::Set(response.status.as_str().to_string()),
            base_type: ActiveValue::Set(response.base_type.as_str().to_string()),
            budget_category: ActiveValue::Set(response.budget_category.as_str().to_string()),
            included: ActiveValue::Set(response.included),
        })
    }
}
