use serde::{Deserialize, Serialize};

/// One migratable repository. `name` is its identity and also the name the
/// destination repository gets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub name: String,
    pub clone_url: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl RepositoryDescriptor {
    pub fn new(name: &str, clone_url: &str) -> Self {
        RepositoryDescriptor {
            name: name.to_string(),
            clone_url: clone_url.to_string(),
            metadata: serde_json::Map::new(),
        }
    }
}

pub fn contains_name(repositories: &[RepositoryDescriptor], name: &str) -> bool {
    repositories.iter().any(|repository| repository.name == name)
}
