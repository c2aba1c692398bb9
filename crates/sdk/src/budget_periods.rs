use api_types::budgets::{BudgetPeriodResponse, BudgetTrackingStatus};
use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{
    ResultEngine,
    cache::{CachedObject, LinkPath},
    locks::EntityKind,
    util::{format_date, parse_date},
};

pub const BUDGET: LinkPath<Entity> = LinkPath {
    name: "budget",
    reference: Column::BudgetId,
    edge: Column::BudgetLink,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub budget_id: i64,
    pub budget_link: Option<i64>,
    pub start_date: String,
    pub end_date: String,
    pub current_amount: String,
    pub target_amount: String,
    pub required_amount: String,
    pub tracking_status: String,
    pub index: i64,
}

impl Model {
    pub fn start_date(&self) -> ResultEngine<NaiveDate> {
        parse_date(&self.start_date, "period start")
    }

    pub fn end_date(&self) -> ResultEngine<NaiveDate> {
        parse_date(&self.end_date, "period end")
    }

    pub fn tracking_status(&self) -> ResultEngine<BudgetTrackingStatus> {
        Ok(BudgetTrackingStatus::try_from(self.tracking_status.as_str())?)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetLink",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Budget,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl CachedObject for Entity {
    const KIND: EntityKind = EntityKind::BudgetPeriods;
    const LINKS: &'static [LinkPath<Self>] = &[BUDGET];

    type Active = ActiveModel;
    type Response = BudgetPeriodResponse;

    fn id_column() -> Column {
        Column::Id
    }

    fn response_id(response: &BudgetPeriodResponse) -> i64 {
        response.id
    }

    fn active_model(response: &BudgetPeriodResponse) -> ResultEngine<ActiveModel> {
        Ok(ActiveModel {
            id: ActiveValue::Set(response.id),
            budget_id: ActiveValue::Set(response.budget_id),
            budget_link: ActiveValue::NotSet,
            start_date: ActiveValue::Set(format_date(response.start_date)),
            end_date: ActiveValue::Set(format_date(response.end_date)),
            current_amount: ActiveValue::Set(response.current_amount.clone()),
            target_amount: ActiveValue::Set(response.target_amount.clone()),
            required_amount: ActiveValue::Set(response.required_amount.clone()),
            tracking_status: ActiveValue::Set(response.tracking_status.as_str().to_string()),
            index: ActiveValue::Set(response.index),
        })
    }
}
