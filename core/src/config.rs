use serde::Deserialize;

/// Settings of the `ms` section, shared by the language server and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub runtime_path: Option<String>,
    pub auto_detect_runtime: bool,
    pub search_paths: Vec<String>,
    pub args: Vec<String>,
    pub show_process_exit: bool,
    pub enable_semantic_tokens: bool,
    pub enable_completions: bool,
    pub enable_hover_docstrings: bool,
    pub enable_signature_help: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            runtime_path: None,
            auto_detect_runtime: true,
            search_paths: Vec::new(),
            args: Vec::new(),
            show_process_exit: true,
            enable_semantic_tokens: true,
            enable_completions: true,
            enable_hover_docstrings: true,
            enable_signature_help: true,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(value: serde_json::Value) -> anyhow::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Explicit interpreter path, ignoring blank values.
    pub fn explicit_runtime(&self) -> Option<&str> {
        self.runtime_path.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}
