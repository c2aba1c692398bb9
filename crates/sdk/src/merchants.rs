use api_types::aggregation::{MerchantResponse, MerchantType};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{
    ResultEngine,
    cache::{CachedObject, LinkPath},
    locks::EntityKind,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "merchants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub merchant_type: String,
    pub small_logo_url: Option<String>,
}

impl Model {
    pub fn merchant_type(&self) -> ResultEngine<MerchantType> {
        Ok(MerchantType::try_from(self.merchant_type.as_str())?)
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
    const KIND: EntityKind = EntityKind::Merchants;
    const LINKS: &'static [LinkPath<Self>] = &[];

    type Active = ActiveModel;
    type Response = MerchantResponse;

    fn id_column() -> Column {
        Column::Id
    }

    fn response_id(response: &MerchantResponse) -> i64 {
        response.id
    }

    fn active_model(response: &MerchantResponse) -> ResultEngine<ActiveModel> {
        Ok(ActiveModel {
            id: ActiveValue::Set(response.id),
            name: ActiveValue::Set(response.name.clone()),
            merchant_type: ActiveValue::Set(response.merchant_type.as_str().to_string()),
            small_logo_url: ActiveValue::Set(response.small_logo_url.clone()),
        })
    }
}
