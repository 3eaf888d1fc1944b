//! Front-end dispatch.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use tfsentry_ir::Graph;

use crate::discover::{discover, WalkOptions};
use crate::error::{FrontendError, FrontendResult};
use crate::terraform::TerraformFrontend;

/// Source languages the dispatcher knows how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Terraform,
}

impl Language {
    /// The canonical tag used in configuration.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Terraform => "hcl",
        }
    }

    /// Parse a language tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "hcl" | "terraform" | "tf" => Some(Self::Terraform),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A language front end: supplies its discovery filters and compiles
/// discovered sources into a resolved graph.
pub trait Frontend: Send + Sync {
    fn language(&self) -> Language;

    /// Language-specific discovery defaults.
    fn walk_options(&self) -> WalkOptions;

    /// Parse the sources and build the resolved IR graph. Unresolved
    /// references are retained in the graph, never dropped.
    fn compile(&self, sources: &[std::path::PathBuf]) -> FrontendResult<Graph>;
}

/// Registry of front ends, keyed by language.
#[derive(Default)]
pub struct FrontendRegistry {
    frontends: HashMap<Language, Arc<dyn Frontend>>,
}

impl FrontendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in front ends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TerraformFrontend::new()));
        registry
    }

    /// Register a front end under its language. An existing registration
    /// for the same language is replaced.
    pub fn register(&mut self, frontend: Arc<dyn Frontend>) {
        debug!("registering front end: {}", frontend.language());
        self.frontends.insert(frontend.language(), frontend);
    }

    pub fn contains(&self, language: Language) -> bool {
        self.frontends.contains_key(&language)
    }

    /// Compile the sources under `root` with the front end registered for
    /// `language`.
    pub fn compile(&self, language: Language, root: &Path) -> FrontendResult<Graph> {
        if root.as_os_str().is_empty() {
            return Err(FrontendError::InvalidInput(
                "compile requires a non-empty root path".to_string(),
            ));
        }
        let frontend = self
            .frontends
            .get(&language)
            .ok_or_else(|| FrontendError::UnsupportedLanguage(language.tag().to_string()))?;

        let sources = discover(root, &frontend.walk_options())?;
        info!(language = %language, sources = sources.len(), "compiling sources");
        frontend.compile(&sources)
    }

    /// Compile by language tag, as configuration supplies it.
    pub fn compile_tag(&self, tag: &str, root: &Path) -> FrontendResult<Graph> {
        let language = Language::from_tag(tag)
            .ok_or_else(|| FrontendError::UnsupportedLanguage(tag.to_string()))?;
        self.compile(language, root)
    }
}

impl std::fmt::Debug for FrontendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrontendRegistry")
            .field("languages", &self.frontends.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_language_tags() {
        assert_eq!(Language::from_tag("hcl"), Some(Language::Terraform));
        assert_eq!(Language::from_tag("terraform"), Some(Language::Terraform));
        assert_eq!(Language::from_tag("cdk"), None);
    }

    #[test]
    fn test_empty_root_is_invalid_input() {
        let registry = FrontendRegistry::with_defaults();
        let result = registry.compile(Language::Terraform, Path::new(""));
        assert!(matches!(result, Err(FrontendError::InvalidInput(_))));
    }

    #[test]
    fn test_unregistered_language_is_unsupported() {
        let registry = FrontendRegistry::new();
        let dir = tempdir().unwrap();
        let result = registry.compile(Language::Terraform, dir.path());
        assert!(matches!(result, Err(FrontendError::UnsupportedLanguage(_))));
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let registry = FrontendRegistry::with_defaults();
        let result = registry.compile_tag("pulumi", Path::new("."));
        assert!(matches!(result, Err(FrontendError::UnsupportedLanguage(_))));
    }

    #[test]
    fn test_compile_empty_directory_yields_empty_graph() {
        let registry = FrontendRegistry::with_defaults();
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let graph = registry.compile(Language::Terraform, dir.path()).unwrap();
        assert!(graph.is_empty());
    }
}
