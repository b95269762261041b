//! Reusable checklist-item template catalog.
//!
//! Templates are seeded into new evaluation forms by value: line items
//! copy the template fields at seed time and keep no live reference, so
//! later template edits or deletions never touch existing forms.

mod area;
mod router;

pub use area::area_for_category;
pub use router::catalog_router;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ServiceError;
use crate::evaluation::{FormId, NewLineItemRecord};
use crate::policy::{authorize, Actor, Operation};
use crate::store::{RecordStore, StoreError};

/// Identifier wrapper for catalog templates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TemplateId(pub i64);

/// One reusable checklist-item definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTemplate {
    pub id: TemplateId,
    /// Category label; maps to an area letter via [`area_for_category`].
    pub category: String,
    pub description: String,
    pub reference: Option<String>,
    /// Training stages the item applies to.
    pub stages: Vec<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Template fields persisted on insert.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplateRecord {
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub stages: Vec<i32>,
}

/// Partial template update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatch {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub stages: Option<Vec<i32>>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Listing filter: case-insensitive category substring plus active flag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Catalog management service. Reads are open to any authenticated
/// caller; writes are gated to managers and administrators.
pub struct CatalogService<S> {
    store: Arc<S>,
}

impl<S> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: RecordStore> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn list(
        &self,
        _actor: &Actor,
        filter: TemplateFilter,
    ) -> Result<Vec<ItemTemplate>, ServiceError> {
        match self.store.templates(&filter) {
            Ok(templates) => Ok(templates),
            Err(StoreError::Unavailable(reason)) => {
                warn!(%reason, "catalog listing degraded to empty result");
                Ok(Vec::new())
            }
        }
    }

    pub fn get(&self, _actor: &Actor, id: TemplateId) -> Result<ItemTemplate, ServiceError> {
        self.store
            .template(id)?
            .ok_or(ServiceError::NotFound("catalog item"))
    }

    /// Sorted distinct category labels across active templates.
    pub fn categories(&self, _actor: &Actor) -> Result<Vec<String>, ServiceError> {
        let filter = TemplateFilter {
            category: None,
            active: Some(true),
        };
        let templates = match self.store.templates(&filter) {
            Ok(templates) => templates,
            Err(StoreError::Unavailable(reason)) => {
                warn!(%reason, "category listing degraded to empty result");
                return Ok(Vec::new());
            }
        };

        let distinct: BTreeSet<String> = templates
            .into_iter()
            .map(|template| template.category)
            .collect();
        Ok(distinct.into_iter().collect())
    }

    pub fn create(
        &self,
        actor: &Actor,
        input: NewTemplateRecord,
    ) -> Result<TemplateId, ServiceError> {
        authorize(actor, Operation::ManageCatalog, None)?;
        if input.category.trim().is_empty() || input.description.trim().is_empty() {
            return Err(ServiceError::Validation(
                "category and description are required".to_string(),
            ));
        }
        Ok(self.store.insert_template(input)?)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: TemplateId,
        patch: TemplatePatch,
    ) -> Result<(), ServiceError> {
        authorize(actor, Operation::ManageCatalog, None)?;
        if self.store.update_template(id, patch)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("catalog item"))
        }
    }

    pub fn delete(&self, actor: &Actor, id: TemplateId) -> Result<(), ServiceError> {
        authorize(actor, Operation::ManageCatalog, None)?;
        if self.store.delete_template(id)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("catalog item"))
        }
    }

    /// Insert a batch of templates, returning how many were stored.
    pub fn import_batch(
        &self,
        actor: &Actor,
        items: Vec<NewTemplateRecord>,
    ) -> Result<usize, ServiceError> {
        authorize(actor, Operation::ManageCatalog, None)?;
        Ok(self.store.insert_templates(items)?)
    }
}

/// Expand every active catalog template into a line item on `form_id`.
///
/// Catalog order becomes the 1-based display order, independent of any
/// items already on the form; re-seeding neither renumbers nor
/// deduplicates. Grades start unset and the template reference, when
/// present, lands in the observation field because line items have no
/// dedicated reference column. Returns the number of items created.
pub fn seed_form_from_catalog<S: RecordStore>(
    store: &S,
    form_id: FormId,
) -> Result<usize, StoreError> {
    let filter = TemplateFilter {
        category: None,
        active: Some(true),
    };
    let templates = store.templates(&filter)?;
    if templates.is_empty() {
        return Ok(0);
    }

    let items: Vec<NewLineItemRecord> = templates
        .into_iter()
        .enumerate()
        .map(|(index, template)| NewLineItemRecord {
            form_id,
            area: area_for_category(&template.category),
            area_name: template.category,
            sub_item: template.description,
            grade: None,
            observations: template.reference,
            position: index as i32 + 1,
        })
        .collect();

    store.insert_line_items(items)
}
