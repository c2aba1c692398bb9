use api_types::bills::{BillFrequency, BillPaymentResponse, BillPaymentStatus, BillType};
use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{
    ResultEngine,
    cache::{CachedObject, LinkPath},
    locks::EntityKind,
    util::{format_date, parse_date},
};

pub const BILL: LinkPath<Entity> = LinkPath {
    name: "bill",
    reference: Column::BillId,
    edge: Column::BillLink,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bill_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub bill_id: i64,
    pub bill_link: Option<i64>,
    pub name: String,
    pub date: String,
    pub payment_status: String,
    pub frequency: String,
    pub bill_type: String,
    pub amount: String,
    pub unpayable: bool,
}

impl Model {
    pub fn date(&self) -> ResultEngine<NaiveDate> {
        parse_date(&self.date, "bill payment")
    }

    pub fn payment_status(&self) -> ResultEngine<BillPaymentStatus> {
        Ok(BillPaymentStatus::try_from(self.payment_status.as_str())?)
    }

    pub fn frequency(&self) -> ResultEngine<BillFrequency> {
        Ok(BillFrequency::try_from(self.frequency.as_str())?)
    }

    pub fn bill_type(&self) -> ResultEngine<BillType> {
        Ok(BillType::try_from(self.bill_type.as_str())?)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bills::Entity",
        from = "Column::BillLink",
        to = "super::bills::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Bill,
}

impl Related<super::bills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bill.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl CachedObject for Entity {
    const KIND: EntityKind = EntityKind::BillPayments;
    const LINKS: &'static [LinkPath<Self>] = &[BILL];

    type Active = ActiveModel;
    type Response = BillPaymentResponse;

    fn id_column() -> Column {
        Column::Id
    }

    fn response_id(response: &BillPaymentResponse) -> i64 {
        response.id
    }

    fn active_model(response: &BillPaymentResponse) -> ResultEngine<ActiveModel> {
        Ok(ActiveModel {
            id: ActiveValue::Set(response.id),
            bill_id: ActiveValue::Set(response.bill_id),
            bill_link: ActiveValue::NotSet,
            name: ActiveValue::Set(response.name.clone()),
            date: ActiveValue::Set(format_date(response.date)),
            payment_status: ActiveValue::Set(response.payment_status.as_str().to_string()),
            frequency: ActiveValue::Set(response.frequency.as_str().to_string()),
            bill_type: ActiveValue::Set(response.bill_type.as_str().to_string()),
            amount: ActiveValue::Set(response.amount.clone()),
            unpayable: ActiveValue::Set(response.unpayable),
        })
    }
}
