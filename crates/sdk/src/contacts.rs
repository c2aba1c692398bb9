//! Cached payment contacts.
//!
//! A contact is one of several payment-method variants. The variant's
//! details are stored as JSON next to the raw method, so the method can be
//! filtered on while the details round-trip unchanged.

use api_types::contacts::{ContactResponse, PaymentDetails, PaymentMethod};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{
    EngineError, ResultEngine,
    cache::{CachedObject, LinkPath},
    locks::EntityKind,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub nick_name: Option<String>,
    pub description: Option<String>,
    pub verified: bool,
    pub related_provider_account_ids: String,
    pub payment_method: String,
    pub payment_details: String,
}

impl Model {
    pub fn payment_method(&self) -> ResultEngine<PaymentMethod> {
        Ok(PaymentMethod::try_from(self.payment_method.as_str())?)
    }

    /// Decode the stored payment details.
    pub fn payment(&self) -> ResultEngine<PaymentDetails> {
        let details: PaymentDetails = serde_json::from_str(&self.payment_details)?;
        if details.method().as_str() != self.payment_method {
            return Err(EngineError::InvalidValue(format!(
                "contact {} stores {} details for method {}",
                self.id,
                details.method().as_str(),
                self.payment_method
            )));
        }
        Ok(details)
    }

    pub fn related_provider_account_ids(&self) -> ResultEngine<Vec<i64>> {
        Ok(serde_json::from_str(&self.related_provider_account_ids)?)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl CachedObject for Entity {
    const KIND: EntityKind = EntityKind::Contacts;
    const LINKS: &'static [LinkPath<Self>] = &[];

    type Active = ActiveModel;
    type Response = ContactResponse;

    fn id_column() -> Column {
        Column::Id
    }

    fn response_id(response: &ContactResponse) -> i64 {
        response.id
    }

    fn active_model(response: &ContactResponse) -> ResultEngine<ActiveModel> {
        Ok(ActiveModel {
            id: ActiveValue::Set(response.id),
            name: ActiveValue::Set(response.name.clone()),
            nick_name: ActiveValue::Set(response.nick_name.clone()),
            description: ActiveValue::Set(response.description.clone()),
            verified: ActiveValue::Set(response.verified),
            related_provider_account_ids: ActiveValue::Set(serde_json::to_string(
                &response.related_provider_account_ids,
            )?),
            payment_method: ActiveValue::Set(response.details.method().as_str().to_string()),
            payment_details: ActiveValue::Set(serde_json::to_string(&response.details)?),
        })
    }
}
