use std::sync::Arc;

use api_types::{
    Paging,
    contacts::{ContactListQuery, ContactRequest, PaymentDetails, PaymentMethod},
};
use sea_orm::Condition;

use super::Shared;
use crate::{
    EngineError, ResultEngine,
    cache::{
        self, Filter, LiveQuery, Sort, id_page_scope, reconcile, reconcile_one, remove,
    },
    contacts,
    locks::EntityKind,
    util::normalize_optional_text,
};

const CONTACT_LOCKS: &[EntityKind] = &[EntityKind::Contacts];

/// Typed read filter for cached contacts.
#[derive(Clone, Debug, Default)]
pub struct ContactFilter {
    pub payment_method: Option<PaymentMethod>,
    pub verified: Option<bool>,
    pub predicate: Option<Condition>,
}

impl ContactFilter {
    fn to_filter(&self) -> Filter<contacts::Entity> {
        let mut filter = Filter::new();
        if let Some(payment_method) = self.payment_method {
            filter = filter.equals(contacts::Column::PaymentMethod, payment_method.as_str());
        }
        if let Some(verified) = self.verified {
            filter = filter.equals(contacts::Column::Verified, verified);
        }
        if let Some(predicate) = &self.predicate {
            filter = filter.predicate(predicate.clone());
        }
        filter
    }
}

/// Changes to apply to a cached contact. `None` keeps the cached value;
/// an empty description clears it. New payment details may switch the
/// contact to another payment method.
#[derive(Clone, Debug, Default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub nick_name: Option<String>,
    pub description: Option<String>,
    pub details: Option<PaymentDetails>,
}

/// Payment contacts.
#[derive(Clone)]
pub struct Contacts {
    shared: Arc<Shared>,
}

impl Contacts {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub async fn contacts(
        &self,
        filter: &ContactFilter,
    ) -> ResultEngine<Option<Vec<contacts::Model>>> {
        cache::list(&self.shared.store, &filter.to_filter(), &Sort::default(), None).await
    }

    pub async fn contact(&self, contact_id: i64) -> ResultEngine<Option<contacts::Model>> {
        cache::get::<contacts::Entity>(&self.shared.store, contact_id).await
    }

    pub fn contacts_live(&self, filter: &ContactFilter) -> Option<LiveQuery<contacts::Entity>> {
        cache::live_query(&self.shared.store, filter.to_filter(), Sort::default(), None)
    }

    /// Fetch one page of contacts, ordered by id, and reconcile it against
    /// the cached contacts inside that page's id window.
    pub async fn refresh_contacts(
        &self,
        before: Option<String>,
        after: Option<String>,
        size: Option<i64>,
    ) -> ResultEngine<Paging> {
        let db = self.shared.database()?;
        let query = ContactListQuery {
            before,
            after,
            size,
        };
        let page = self.shared.api.fetch_contacts(&query).await?;

        let ids: Vec<i64> = page.data.iter().map(|contact| contact.id).collect();
        let scope = id_page_scope(
            Condition::all(),
            contacts::Column::Id,
            &ids,
            &page.paging.cursors,
        );
        self.shared
            .persist(
                "refresh_contacts",
                CONTACT_LOCKS,
                reconcile::<contacts::Entity>(db, &page.data, &scope, &[]),
            )
            .await;
        Ok(page.paging)
    }

    pub async fn refresh_contact(&self, contact_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self.shared.api.fetch_contact(contact_id).await?;
        self.shared
            .persist(
                "refresh_contact",
                CONTACT_LOCKS,
                reconcile_one::<contacts::Entity>(db, &response, &[]),
            )
            .await;
        Ok(())
    }

    /// Create a contact and return its id.
    pub async fn create_contact(&self, request: ContactRequest) -> ResultEngine<i64> {
        let db = self.shared.database()?;
        if request.nick_name.trim().is_empty() {
            return Err(EngineError::InvalidValue(
                "contact nickname must not be empty".to_string(),
            ));
        }
        let response = self.shared.api.create_contact(&request).await?;
        self.shared
            .persist(
                "create_contact",
                CONTACT_LOCKS,
                reconcile_one::<contacts::Entity>(db, &response, &[]),
            )
            .await;
        Ok(response.id)
    }

    /// Apply `patch` on top of the cached contact and send the full contact.
    pub async fn update_contact(&self, contact_id: i64, patch: ContactPatch) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let Some(current) = cache::get::<contacts::Entity>(&self.shared.store, contact_id).await?
        else {
            return Err(EngineError::KeyNotFound(format!("contact {contact_id}")));
        };

        let details = match patch.details {
            Some(details) => details,
            None => current.payment()?,
        };
        let request = ContactRequest {
            name: Some(patch.name.unwrap_or(current.name)),
            nick_name: patch
                .nick_name
                .or(current.nick_name)
                .unwrap_or_default(),
            description: match patch.description {
                Some(description) => normalize_optional_text(Some(description.as_str())),
                None => current.description,
            },
            details,
        };
        let response = self.shared.api.update_contact(contact_id, &request).await?;
        self.shared
            .persist(
                "update_contact",
                CONTACT_LOCKS,
                reconcile_one::<contacts::Entity>(db, &response, &[]),
            )
            .await;
        Ok(())
    }

    pub async fn delete_contact(&self, contact_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        self.shared.api.delete_contact(contact_id).await?;
        self.shared
            .persist(
                "delete_contact",
                CONTACT_LOCKS,
                remove::<contacts::Entity>(db, &[contact_id]),
            )
            .await;
        Ok(())
    }
}

