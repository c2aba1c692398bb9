use api_types::aggregation::{BudgetCategory, CategoryType, TransactionCategoryResponse};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{
    ResultEngine,
    cache::{CachedObject, LinkPath},
    locks::EntityKind,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub category_type: String,
    pub default_budget_category: String,
    pub icon_url: Option<String>,
}

impl Model {
    pub fn category_type(&self) -> ResultEngine<CategoryType> {
        Ok(CategoryType::try_from(self.category_type.as_str())?)
    }

    pub fn default_budget_category(&self) -> ResultEngine<BudgetCategory> {
        Ok(BudgetCategory::try_from(self.default_budget_category.as_str())?)
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
    const KIND: EntityKind = EntityKind::TransactionCategories;
    const LINKS: &'static [LinkPath<Self>] = &[];

    type Active = ActiveModel;
    type Response = TransactionCategoryResponse;

    fn id_column() -> Column {
        Column::Id
    }

    fn response_id(response: &TransactionCategoryResponse) -> i64 {
        response.id
    }

    fn active_model(response: &TransactionCategoryResponse) -> ResultEngine<ActiveModel> {
        Ok(ActiveModel {
            id: ActiveValue::Set(response.id),
            name: ActiveValue::Set(response.name.clone()),
            category_type: ActiveValue::Set(response.category_type.as_str().to_string()),
            default_budget_category: ActiveValue::Set(
                response.default_budget_category.as_str().to_string(),
            ),
            icon_url: ActiveValue::Set(response.icon_url.clone()),
        })
    }
}
