//! Catalog file I/O
//!
//! Thin collaborator around the JSON catalog document. The reference lists
//! (`regions`, `companyTypes`) are carried through untouched; the core never
//! validates records against them.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::services::{EnrichedRecord, Record};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDataset {
    #[serde(default)]
    pub companies: Vec<Record>,
    #[serde(default)]
    pub regions: Vec<Value>,
    #[serde(default, rename = "companyTypes")]
    pub company_types: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedDataset {
    #[serde(default)]
    pub regions: Vec<Value>,
    #[serde(default, rename = "companyTypes")]
    pub company_types: Vec<Value>,
    pub companies: Vec<EnrichedRecord>,
    pub metadata: DatasetMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub total_companies: usize,
    pub rag_enhanced: bool,
    pub embedding_model: String,
    pub processed_at: DateTime<Utc>,
}

pub fn load_raw(path: &Path) -> AppResult<RawDataset> {
    let raw = read(path)?;
    let dataset: RawDataset = serde_json::from_str(&raw)
        .map_err(|e| AppError::Dataset(format!("parse {} failed: {e}", path.display())))?;

    tracing::info!(
        companies = dataset.companies.len(),
        regions = dataset.regions.len(),
        company_types = dataset.company_types.len(),
        "catalog loaded"
    );
    Ok(dataset)
}

pub fn load_enriched(path: &Path) -> AppResult<EnrichedDataset> {
    let raw = read(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Dataset(format!("parse {} failed: {e}", path.display())))
}

pub fn save_enriched(path: &Path, dataset: &EnrichedDataset) -> AppResult<()> {
    let json = serde_json::to_string_pretty(dataset)
        .map_err(|e| AppError::Dataset(format!("serialize catalog failed: {e}")))?;
    fs::write(path, json)
        .map_err(|e| AppError::Dataset(format!("write {} failed: {e}", path.display())))?;

    tracing::info!(path = %path.display(), companies = dataset.companies.len(), "catalog saved");
    Ok(())
}

fn read(path: &Path) -> AppResult<String> {
    fs::read_to_string(path)
        .map_err(|e| AppError::Dataset(format!("read {} failed: {e}", path.display())))
}
