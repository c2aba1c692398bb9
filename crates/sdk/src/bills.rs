//! Cached bills.

use api_types::bills::{BillFrequency, BillPaymentStatus, BillResponse, BillStatus, BillType};
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
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub bill_type: String,
    pub status: String,
    pub frequency: String,
    pub payment_status: String,
    pub next_payment_date: String,
    pub next_payment_amount: String,
    pub due_amount: String,
    pub average_amount: String,
    pub last_payment_date: Option<String>,
    pub notes: Option<String>,
    pub account_id: Option<i64>,
    pub account_link: Option<i64>,
    pub merchant_id: Option<i64>,
    pub merchant_link: Option<i64>,
    pub category_id: Option<i64>,
    pub category_link: Option<i64>,
}

impl Model {
    pub fn bill_type(&self) -> ResultEngine<BillType> {
        Ok(BillType::try_from(self.bill_type.as_str())?)
    }

    pub fn status(&self) -> ResultEngine<BillStatus> {
        Ok(BillStatus::try_from(self.status.as_str())?)
    }

    pub fn frequency(&self) -> ResultEngine<BillFrequency> {
        Ok(BillFrequency::try_from(self.frequency.as_str())?)
    }

    pub fn payment_status(&self) -> ResultEngine<BillPaymentStatus> {
        Ok(BillPaymentStatus::try_from(self.payment_status.as_str())?)
    }

    pub fn next_payment_date(&self) -> ResultEngine<NaiveDate> {
        parse_date(&self.next_payment_date, "next payment")
    }

    pub fn last_payment_date(&self) -> ResultEngine<Option<NaiveDate>> {
        self.last_payment_date
            .as_deref()
            .map(|date| parse_date(date, "last payment"))
            .transpose()
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
    #[sea_orm(has_many = "super::bill_payments::Entity")]
    Payments,
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

impl Related<super::bill_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl CachedObject for Entity {
    const KIND: EntityKind = EntityKind::Bills;
    const LINKS: &'static [LinkPath<Self>] = &[ACCOUNT, MERCHANT, CATEGORY];

    type Active = ActiveModel;
    type Response = BillResponse;

    fn id_column() -> Column {
        Column::Id
    }

    fn response_id(response: &BillResponse) -> i64 {
        response.id
    }

    fn active_model(response: &BillResponse) -> ResultEngine<ActiveModel> {
        Ok(ActiveModel {
            id: ActiveValue::Set(response.id),
            name: ActiveValue::Set(response.name.clone()),
            description: ActiveValue::Set(response.description.clone()),
            bill_type: ActiveValue::Set(response.bill_type.as_str().to_string()),
            status: ActiveValue::Set(response.status.as_str().to_string()),
            frequency: ActiveValue::Set(response.frequency.as_str().to_string()),
            payment_status: ActiveValue::Set(response.payment_status.as_str().to_string()),
            next_payment_date: ActiveValue::Set(format_date(response.next_payment_date)),
            next_payment_amount: ActiveValue::Set(response.next_payment_amount.clone()),
            due_amount: ActiveValue::Set(response.due_amount.clone()),
            average_amount: ActiveValue::Set(response.average_amount.clone()),
            last_payment_date: ActiveValue::Set(response.last_payment_date.map(format_date)),
            notes: ActiveValue::Set(response.notes.clone()),
            account_id: ActiveValue::Set(response.account_id),
            account_link: ActiveValue::NotSet,
            merchant_id: ActiveValue::Set(response.merchant_id),
            merchant_link: ActiveValue::NotSet,
            category_id: ActiveValue::Set(response.category_id),
            category_link: ActiveValue::NotSet,
        })
    }
}
