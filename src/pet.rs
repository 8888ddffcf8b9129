use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pet as edited by the form and sent to the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub poddy_trained: bool,
    #[serde(default)]
    pub diet: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
}

/// A record as listed by the backend, carrying its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPet {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub record: PetRecord,
}

/// One editable field of a [`PetRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PetField {
    Name,
    OwnerName,
    Species,
    Age,
    PoddyTrained,
    Diet,
    ImageUrl,
    Likes,
    Dislikes,
}

impl PetField {
    /// All fields in form order.
    pub fn all() -> &'static [PetField] {
        &[
            PetField::Name,
            PetField::OwnerName,
            PetField::Species,
            PetField::Age,
            PetField::PoddyTrained,
            PetField::Diet,
            PetField::ImageUrl,
            PetField::Likes,
            PetField::Dislikes,
        ]
    }

    /// JSON key of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            PetField::Name => "name",
            PetField::OwnerName => "owner_name",
            PetField::Species => "species",
            PetField::Age => "age",
            PetField::PoddyTrained => "poddy_trained",
            PetField::Diet => "diet",
            PetField::ImageUrl => "image_url",
            PetField::Likes => "likes",
            PetField::Dislikes => "dislikes",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PetField::Name => "Name",
            PetField::OwnerName => "Owner",
            PetField::Species => "Species",
            PetField::Age => "Age",
            PetField::PoddyTrained => "Potty Trained",
            PetField::Diet => "Diet",
            PetField::ImageUrl => "Image URL",
            PetField::Likes => "Likes",
            PetField::Dislikes => "Dislikes",
        }
    }

    /// Maximum input length in characters, if the control declares one.
    pub fn max_len(&self) -> Option<usize> {
        match self {
            PetField::Name | PetField::OwnerName => Some(20),
            PetField::Species => Some(30),
            PetField::Diet | PetField::Likes | PetField::Dislikes => Some(60),
            PetField::Age | PetField::PoddyTrained | PetField::ImageUrl => None,
        }
    }

    pub fn is_checkbox(&self) -> bool {
        matches!(self, PetField::PoddyTrained)
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| *f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| *f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

/// Raw value read from a control: text for inputs, checked state for the checkbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

/// Join list items for display in a single text control.
pub fn encode_list(items: &[String]) -> String {
    items.join(", ")
}

/// Split delimited text back into trimmed, non-empty items.
pub fn decode_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

impl PetRecord {
    /// Return a copy of `self` with exactly `field` replaced by `value`.
    /// A value of the wrong kind for the field leaves the record unchanged.
    pub fn with_field(&self, field: PetField, value: FieldValue) -> PetRecord {
        let mut next = self.clone();
        match (field, value) {
            (PetField::PoddyTrained, FieldValue::Checked(checked)) => next.poddy_trained = checked,
            (PetField::PoddyTrained, FieldValue::Text(_)) => {}
            (_, FieldValue::Checked(_)) => {}
            (PetField::Name, FieldValue::Text(text)) => next.name = text,
            (PetField::OwnerName, FieldValue::Text(text)) => next.owner_name = text,
            (PetField::Species, FieldValue::Text(text)) => next.species = text,
            (PetField::ImageUrl, FieldValue::Text(text)) => next.image_url = text,
            (PetField::Age, FieldValue::Text(text)) => next.age = text.trim().parse().ok(),
            (PetField::Diet, FieldValue::Text(text)) => next.diet = decode_list(&text),
            (PetField::Likes, FieldValue::Text(text)) => next.likes = decode_list(&text),
            (PetField::Dislikes, FieldValue::Text(text)) => next.dislikes = decode_list(&text),
        }
        next
    }

    /// Text shown in the field's control.
    pub fn field_text(&self, field: PetField) -> String {
        match field {
            PetField::Name => self.name.clone(),
            PetField::OwnerName => self.owner_name.clone(),
            PetField::Species => self.species.clone(),
            PetField::Age => self.age.map(|a| a.to_string()).unwrap_or_default(),
            PetField::PoddyTrained => (if self.poddy_trained { "yes" } else { "no" }).to_string(),
            PetField::Diet => encode_list(&self.diet),
            PetField::ImageUrl => self.image_url.clone(),
            PetField::Likes => encode_list(&self.likes),
            PetField::Dislikes => encode_list(&self.dislikes),
        }
    }
}

/// Per-field validation messages, only ever keyed by required fields.
pub type ValidationErrors = BTreeMap<PetField, &'static str>;

/// Check the required fields of `record`. Only empty values are rejected.
pub fn validate(record: &PetRecord) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if record.name.is_empty() {
        errors.insert(PetField::Name, "Name is required");
    }
    if record.owner_name.is_empty() {
        errors.insert(PetField::OwnerName, "Owner is required");
    }
    if record.species.is_empty() {
        errors.insert(PetField::Species, "Species is required");
    }
    if record.image_url.is_empty() {
        errors.insert(PetField::ImageUrl, "Image URL is required");
    }
    errors
}
