use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Entity, ItemId, LocationCode};

/// Physical size of one unit, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub length: f64,
}

impl Dimensions {
    pub fn validate(&self) -> DomainResult<()> {
        for (label, value) in [("width", self.width), ("height", self.height), ("length", self.length)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DomainError::validation(format!(
                    "dimension {label} must be a positive number (got {value})"
                )));
            }
        }
        Ok(())
    }
}

/// Catalog item (master data).
///
/// Items may be deleted while batches still reference them; projections fall
/// back to the raw item id for such orphaned batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub dimensions: Dimensions,
    pub weight_grams: u32,
    pub frozen: bool,
    pub expirable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_aisle_id: Option<LocationCode>,
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Item {
    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        self.dimensions.validate()?;
        if self.weight_grams == 0 {
            return Err(DomainError::validation("weightGrams must be positive"));
        }
        if let Some(code) = &self.default_aisle_id {
            LocationCode::parse(code.as_str())?;
        }
        Ok(())
    }
}

/// Input for creating an item. The catalog assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub dimensions: Dimensions,
    pub weight_grams: u32,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub expirable: bool,
    #[serde(default)]
    pub default_aisle_id: Option<LocationCode>,
}

impl NewItem {
    /// Validate the draft and attach `id`.
    pub fn into_item(self, id: ItemId) -> DomainResult<Item> {
        let item = Item {
            id,
            name: self.name,
            description: self.description,
            dimensions: self.dimensions,
            weight_grams: self.weight_grams,
            frozen: self.frozen,
            expirable: self.expirable,
            default_aisle_id: self.default_aisle_id,
        };
        item.validate()?;
        Ok(item)
    }
}

/// Partial update; only `Some` fields are applied and `id` is immutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub weight_grams: Option<u32>,
    pub frozen: Option<bool>,
    pub expirable: Option<bool>,
    pub default_aisle_id: Option<LocationCode>,
}

impl ItemPatch {
    /// Merge into `current`. The merged item is re-validated before it is returned.
    pub fn apply_to(self, current: &Item) -> DomainResult<Item> {
        let merged = Item {
            id: current.id.clone(),
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self.description.or_else(|| current.description.clone()),
            dimensions: self.dimensions.unwrap_or(current.dimensions),
            weight_grams: self.weight_grams.unwrap_or(current.weight_grams),
            frozen: self.frozen.unwrap_or(current.frozen),
            expirable: self.expirable.unwrap_or(current.expirable),
            default_aisle_id: self.default_aisle_id.or_else(|| current.default_aisle_id.clone()),
        };
        merged.validate()?;
        Ok(merged)
    }
}

/// Candidate item id: the first three characters of the trimmed, uppercased
/// name, followed by a three-digit sequence number (`FRE-004`).
///
/// Callers must check the candidate against existing ids and advance `seq`
/// on collision.
pub fn item_id_candidate(name: &str, seq: usize) -> ItemId {
    let prefix: String = name.trim().to_uppercase().chars().take(3).collect();
    ItemId::new(format!("{prefix}-{seq:03}"))
}
