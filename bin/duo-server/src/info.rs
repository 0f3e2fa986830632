//! Info page assembly.
//!
//! Turns the deployment configuration and a snapshot of the pet table into
//! the flat set of labelled values the index view renders.

use duo_store::Pet;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Config;

pub const FRAMEWORK: &str = "Axum";
/// `axum` version resolved in Cargo.lock at build time.
pub const FRAMEWORK_VERSION: &str = env!("DUO_AXUM_VERSION");
pub const LANGUAGE: &str = "Rust";
pub const LANGUAGE_VERSION: &str = env!("DUO_RUSTC_VERSION");
pub const RUNTIME: &str = "Tokio";
pub const UNKNOWN_DATABASE: &str = "Unknown Database";

/// Values handed to the view layer. Field names serialize to the keys the
/// template and `/api/info` consumers expect.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfoPage {
    pub uuid: String,
    pub version: String,
    pub deployment_color: String,
    pub framework: String,
    pub framework_version: String,
    pub language: String,
    pub language_version: String,
    pub runtime: String,
    pub database: String,
    pub pets: Vec<PetView>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PetView {
    pub id: i64,
    pub name: String,
}

impl From<Pet> for PetView {
    fn from(pet: Pet) -> Self {
        Self { id: pet.id, name: pet.name }
    }
}

/// Best-effort vendor label for a connection string. Plain substring
/// matching; the string is not validated as a URL.
pub fn detect_database_type(url: Option<&str>) -> &'static str {
    match url {
        Some(u) if u.contains("mysql") => "MySQL",
        Some(u) if u.contains("postgresql") => "PostgreSQL",
        _ => UNKNOWN_DATABASE,
    }
}

pub fn assemble(config: &Config, pets: Vec<Pet>) -> InfoPage {
    InfoPage {
        uuid: config.app_uuid.clone(),
        version: config.app_version.clone(),
        deployment_color: config.deployment_color.clone(),
        framework: FRAMEWORK.to_owned(),
        framework_version: FRAMEWORK_VERSION.to_owned(),
        language: LANGUAGE.to_owned(),
        language_version: LANGUAGE_VERSION.to_owned(),
        runtime: RUNTIME.to_owned(),
        database: detect_database_type(Some(config.database_url.as_str())).to_owned(),
        pets: pets.into_iter().map(PetView::from).collect(),
    }
}
