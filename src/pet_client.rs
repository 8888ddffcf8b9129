use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use url::Url;

use crate::pet::{PetRecord, StoredPet};

const JSON_CONTENT_TYPE: &str = "application/json";
const PETS_PATH: &str = "/api/pets";

/// Why a create or update call did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("no pet id in the current route")]
    MissingId,
    #[error("pet id {0:?} is not a usable path segment")]
    InvalidId(String),
    #[error("invalid pet url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Path of the pet collection endpoint.
pub fn pets_endpoint() -> String {
    PETS_PATH.to_string()
}

/// JSON client for the pet backend.
#[derive(Debug, Clone)]
pub struct PetClient {
    http: reqwest::Client,
    base_url: String,
}

impl PetClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of a single pet. `id` becomes one percent-encoded path segment.
    fn pet_url(&self, id: &str) -> Result<Url, SubmitError> {
        // Url drops dot segments instead of encoding them.
        if id.is_empty() || id == "." || id == ".." {
            return Err(SubmitError::InvalidId(id.to_string()));
        }
        let mut url = Url::parse(&self.url(PETS_PATH))?;
        url.path_segments_mut()
            .map_err(|_| SubmitError::InvalidId(id.to_string()))?
            .push(id);
        Ok(url)
    }

    /// POST a new pet. Any 2xx counts as success; the body is not read.
    pub async fn create_pet(&self, record: &PetRecord) -> Result<(), SubmitError> {
        let res = self
            .http
            .post(self.url(&pets_endpoint()))
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .json(record)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(SubmitError::Status(res.status().as_u16()));
        }
        Ok(())
    }

    /// PUT an edited pet and return the record the server stored.
    pub async fn update_pet(&self, id: &str, record: &PetRecord) -> Result<PetRecord, SubmitError> {
        let res = self
            .http
            .put(self.pet_url(id)?)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .json(record)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(SubmitError::Status(res.status().as_u16()));
        }
        let envelope: DataEnvelope<PetRecord> = res.json().await?;
        Ok(envelope.data)
    }

    /// GET a single pet, used to seed the edit form.
    pub async fn fetch_pet(&self, id: &str) -> Result<StoredPet> {
        let url = self.pet_url(id)?;
        let res = self
            .http
            .get(url)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .send()
            .await
            .with_context(|| format!("Failed to fetch pet {}", id))?
            .error_for_status()
            .with_context(|| format!("Backend rejected fetch of pet {}", id))?;
        let envelope: DataEnvelope<StoredPet> = res
            .json()
            .await
            .with_context(|| format!("Failed to parse pet {}", id))?;
        Ok(envelope.data)
    }

    /// GET every pet for the home list.
    pub async fn list_pets(&self) -> Result<Vec<StoredPet>> {
        let res = self
            .http
            .get(self.url(&pets_endpoint()))
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .send()
            .await
            .context("Failed to list pets")?
            .error_for_status()
            .context("Backend rejected pet list")?;
        let envelope: DataEnvelope<Vec<StoredPet>> =
            res.json().await.context("Failed to parse pet list")?;
        Ok(envelope.data)
    }
}
