//! Registry collaborator interface and in-memory implementation.
//!
//! The pipeline only ever sees the `TemplateRegistry` trait; the storage
//! backend behind it is a collaborator. `InMemoryRegistry` keeps full
//! version history per name and can persist itself to a JSON file, which is
//! what the CLI uses as its store.

use crate::template::Template;
use querypilot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// Registry collaborator interface consumed by the pipeline.
///
/// The pipeline fetches a read-only snapshot once per query via `load_all`.
#[async_trait::async_trait]
pub trait TemplateRegistry: Send + Sync {
    /// Load the production version of every registered template.
    async fn load_all(&self) -> AppResult<HashMap<String, Template>>;

    /// Get the production version of a template by name.
    ///
    /// # Errors
    /// `AppError::Registry` if the name is unknown.
    async fn get(&self, name: &str) -> AppResult<Template>;
}

/// Summary row for listing templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub name: String,
    pub version: u32,
    pub content_type: String,
    pub variables: Vec<String>,
}

/// Full detail view of a template, including its version history.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateDetails {
    pub name: String,
    pub latest_version: u32,
    pub production_version: Option<u32>,
    /// Versions that are neither latest nor production
    pub archived_versions: Vec<u32>,
    pub variables: Vec<String>,
    pub tags: HashMap<String, String>,
    /// Body of the latest version
    pub template: String,
}

/// Outcome of a sample registration pass.
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub registered: usize,
    pub skipped: usize,
}

/// Serialized store layout: every version of every template.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    templates: Vec<Template>,
}

/// Import document layout (`register --file`).
#[derive(Debug, Deserialize)]
struct PromptsFile {
    prompts: Vec<PromptEntry>,
}

#[derive(Debug, Deserialize)]
struct PromptEntry {
    name: String,
    template: String,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// In-memory template registry with version history.
#[derive(Default)]
pub struct InMemoryRegistry {
    // name -> versions, ascending; the production version is flagged
    templates: RwLock<HashMap<String, Vec<Template>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new version of a template.
    ///
    /// The first registration creates version 1; later registrations bump
    /// the version and move the production flag to the new version.
    pub fn register(
        &self,
        name: &str,
        body: &str,
        tags: HashMap<String, String>,
    ) -> AppResult<Template> {
        let mut templates = self
            .templates
            .write()
            .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))?;

        let versions = templates.entry(name.to_string()).or_default();

        let mut template = Template::new(name, body, tags);
        template.version = versions.last().map(|t| t.version + 1).unwrap_or(1);

        for prior in versions.iter_mut() {
            prior.production = false;
        }
        versions.push(template.clone());

        tracing::info!(
            name = %template.name,
            version = template.version,
            "Registered template"
        );

        Ok(template)
    }

    /// Import templates from a prompts document:
    /// `{"prompts": [{"name", "template", "tags"}]}`.
    ///
    /// Returns the number of templates registered.
    pub fn import_file(&self, path: &Path) -> AppResult<usize> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Registry(format!("Failed to read prompts file {:?}: {}", path, e))
        })?;

        let doc: PromptsFile = serde_json::from_str(&contents).map_err(|e| {
            AppError::Registry(format!("Failed to parse prompts file {:?}: {}", path, e))
        })?;

        let count = doc.prompts.len();
        for entry in doc.prompts {
            self.register(&entry.name, &entry.template, entry.tags)?;
        }

        Ok(count)
    }

    /// Load a registry from a previously saved store file.
    ///
    /// A missing file yields an empty registry.
    pub fn load_store(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Registry(format!("Failed to read store file {:?}: {}", path, e))
        })?;

        let store: StoreFile = serde_json::from_str(&contents).map_err(|e| {
            AppError::Registry(format!("Failed to parse store file {:?}: {}", path, e))
        })?;

        let registry = Self::new();
        {
            let mut templates = registry
                .templates
                .write()
                .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))?;
            for template in store.templates {
                templates
                    .entry(template.name.clone())
                    .or_default()
                    .push(template);
            }
            for versions in templates.values_mut() {
                versions.sort_by_key(|t| t.version);
            }
        }

        Ok(registry)
    }

    /// Persist every version of every template to a store file.
    pub fn save_store(&self, path: &Path) -> AppResult<()> {
        let templates = self
            .templates
            .read()
            .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))?;

        let mut all: Vec<Template> = templates.values().flatten().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.version.cmp(&b.version)));

        let store = StoreFile { templates: all };
        let contents = serde_json::to_string_pretty(&store)
            .map_err(|e| AppError::Serialization(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| {
            AppError::Registry(format!("Failed to write store file {:?}: {}", path, e))
        })?;

        Ok(())
    }

    /// Register the built-in sample templates.
    ///
    /// With `only_new` set, names that already exist are skipped instead of
    /// receiving a new version.
    pub fn register_samples(&self, only_new: bool) -> AppResult<SampleReport> {
        let mut report = SampleReport {
            registered: 0,
            skipped: 0,
        };

        for sample in crate::samples::sample_templates() {
            if only_new && self.contains(&sample.name)? {
                report.skipped += 1;
                continue;
            }
            self.register(&sample.name, &sample.body, sample.tags.clone())?;
            report.registered += 1;
        }

        Ok(report)
    }

    fn contains(&self, name: &str) -> AppResult<bool> {
        let templates = self
            .templates
            .read()
            .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))?;
        Ok(templates.contains_key(name))
    }

    /// Detail view of a single template, covering all its versions.
    ///
    /// # Errors
    /// `AppError::Registry` if the name is unknown.
    pub fn details(&self, name: &str) -> AppResult<TemplateDetails> {
        let templates = self
            .templates
            .read()
            .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))?;

        let versions = templates
            .get(name)
            .filter(|versions| !versions.is_empty())
            .ok_or_else(|| AppError::Registry(format!("Template not found: {}", name)))?;

        // Non-empty by the filter above
        let latest = versions
            .last()
            .ok_or_else(|| AppError::Registry(format!("Template not found: {}", name)))?;
        let production_version = versions.iter().find(|t| t.production).map(|t| t.version);

        let archived_versions = versions
            .iter()
            .map(|t| t.version)
            .filter(|v| *v != latest.version && Some(*v) != production_version)
            .collect();

        Ok(TemplateDetails {
            name: latest.name.clone(),
            latest_version: latest.version,
            production_version,
            archived_versions,
            variables: latest.variables(),
            tags: latest.tags.clone(),
            template: latest.body.clone(),
        })
    }

    /// Summarize the production version of every template.
    pub fn list(&self) -> AppResult<Vec<TemplateSummary>> {
        let templates = self
            .templates
            .read()
            .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))?;

        let mut summaries: Vec<TemplateSummary> = templates
            .values()
            .filter_map(|versions| production_of(versions))
            .map(|t| TemplateSummary {
                name: t.name.clone(),
                version: t.version,
                content_type: t.content_type().to_string(),
                variables: t.variables(),
            })
            .collect();

        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }
}

/// The production version of a template, falling back to the latest.
fn production_of(versions: &[Template]) -> Option<&Template> {
    versions
        .iter()
        .find(|t| t.production)
        .or_else(|| versions.last())
}

#[async_trait::async_trait]
impl TemplateRegistry for InMemoryRegistry {
    async fn load_all(&self) -> AppResult<HashMap<String, Template>> {
        let templates = self
            .templates
            .read()
            .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))?;

        Ok(templates
            .iter()
            .filter_map(|(name, versions)| {
                production_of(versions).map(|t| (name.clone(), t.clone()))
            })
            .collect())
    }

    async fn get(&self, name: &str) -> AppResult<Template> {
        let templates = self
            .templates
            .read()
            .map_err(|_| AppError::Registry("Registry lock poisoned".to_string()))?;

        templates
            .get(name)
            .and_then(|versions| production_of(versions))
            .cloned()
            .ok_or_else(|| AppError::Registry(format!("Template not found: {}", name)))
    }
}
