//! Cached budgets.

use api_types::budgets::{
    BudgetFrequency, BudgetResponse, BudgetStatus, BudgetTrackingStatus, BudgetType,
};
use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{
    ResultEngine,
    cache::{CachedObject, LinkPath},
    locks::EntityKind,
    util::{format_date, parse_date},
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub budget_type: String,
    pub type_value: String,
    pub frequency: String,
    pub status: String,
    pub is_current: bool,
    pub current_amount: String,
    pub target_amount: Option<String>,
    pub period_amount: String,
    pub start_date: Option<String>,
    pub tracking_status: String,
    pub image_url: Option<String>,
}

impl Model {
    pub fn budget_type(&self) -> ResultEngine<BudgetType> {
        Ok(BudgetType::try_from(self.budget_type.as_str())?)
    }

    pub fn frequency(&self) -> ResultEngine<BudgetFrequency> {
        Ok(BudgetFrequency::try_from(self.frequency.as_str())?)
    }

    pub fn status(&self) -> ResultEngine<BudgetStatus> {
        Ok(BudgetStatus::try_from(self.status.as_str())?)
    }

    pub fn tracking_status(&self) -> ResultEngine<BudgetTrackingStatus> {
        Ok(BudgetTrackingStatus::try_from(self.tracking_status.as_str())?)
    }

    pub fn start_date(&self) -> ResultEngine<Option<NaiveDate>> {
        self.start_date
            .as_deref()
            .map(|date| parse_date(date, "budget start"))
            .transpose()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_periods::Entity")]
    Periods,
}

impl Related<super::budget_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Periods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl CachedObject for Entity {
    const KIND: EntityKind = EntityKind::Budgets;
    const LINKS: &'static [LinkPath<Self>] = &[];

    type Active = ActiveModel;
    type Response = BudgetResponse;

    fn id_column() -> Column {
        Column::Id
    }

    fn response_id(response: &BudgetResponse) -> i64 {
        response.id
    }

    fn active_model(response: &BudgetResponse) -> ResultEngine<ActiveModel> {
        Ok(ActiveModel {
            id: ActiveValue::Set(response.id),
            budget_type: ActiveValue::Set(response.budget_type.as_str().to_string()),
            type_value: ActiveValue::Set(response.type_value.clone()),
            frequency: ActiveValue::Set(response.frequency.as_str().to_string()),
            status: ActiveValue::Set(response.status.as_str().to_string()),
            is_current: ActiveValue::Set(response.is_current),
            current_amount: ActiveValue::Set(response.current_amount.clone()),
            target_amount: ActiveValue::Set(response.target_amount.clone()),
            period_amount: ActiveValue::Set(response.period_amount.clone()),
            start_date: ActiveValue::Set(response.start_date.map(format_date)),
            tracking_status: ActiveValue::Set(response.tracking_status.as_str().to_string()),
            image_url: ActiveValue::Set(response.image_url.clone()),
        })
    }
}
