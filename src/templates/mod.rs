mod models;

use std::{collections::HashSet, sync::OnceLock};

pub use models::TemplateEntry;

/// Built-in catalogue, in fetch order.
const BUILTIN_JSON: &str = include_str!("../../resources/templates.json");

/// Single, module-private cache (set exactly once).
static CACHE: OnceLock<Vec<TemplateEntry>> = OnceLock::new();

// ---- Public API ----

/// Parse and validate a catalogue without touching the cache.
pub fn parse_catalogue(json: &str) -> Result<Vec<TemplateEntry>, CatalogueError> {
    let parsed: Vec<TemplateEntry> = serde_json::from_str(json)?;
    validate(&parsed)?;
    Ok(parsed)
}

/// Initialize from the compiled-in catalogue.
pub fn init_builtin() -> Result<(), CatalogueError> {
    init_from_json_str(BUILTIN_JSON)
}

/// Initialize from a JSON string (e.g. a mirror manifest taken from the environment).
pub fn init_from_json_str(json: &str) -> Result<(), CatalogueError> {
    let parsed = parse_catalogue(json)?;
    CACHE.set(parsed).map_err(|_| CatalogueError::AlreadyInitialized)?;
    Ok(())
}

/// Borrow the initialized catalogue in fetch order.
pub fn all() -> Result<&'static [TemplateEntry], CatalogueError> {
    CACHE
        .get()
        .map(|v| v.as_slice())
        .ok_or(CatalogueError::NotInitialized)
}

fn validate(entries: &[TemplateEntry]) -> Result<(), CatalogueError> {
    if entries.is_empty() {
        return Err(CatalogueError::Empty);
    }

    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.label()) {
            return Err(CatalogueError::DuplicateLabel(entry.label().to_string()));
        }

        let parsed = url::Url::parse(entry.url()).map_err(|source| CatalogueError::InvalidUrl {
            label: entry.label().to_string(),
            reason: source.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogueError::InvalidUrl {
                label: entry.label().to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
    }

    Ok(())
}

/// ---- Errors ----
#[derive(thiserror::Error, Debug)]
pub enum CatalogueError {
    #[error("template catalogue is not initialized")]
    NotInitialized,
    #[error("template catalogue already initialized")]
    AlreadyInitialized,
    #[error("template catalogue is empty")]
    Empty,
    #[error("duplicate template label: {0}")]
    DuplicateLabel(String),
    #[error("invalid url for template '{label}': {reason}")]
    InvalidUrl { label: String, reason: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
