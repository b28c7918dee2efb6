// Language configuration management for casecheck
use anyhow::{bail, Context, Result};
use casecheck_common::types::LanguageKind;
use casecheck_common::HarnessError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::engine::LaunchCommand;

const SOURCE_PLACEHOLDER: &str = "{source}";
const ARTIFACT_PLACEHOLDER: &str = "{artifact}";

/// Built-in copy of config/languages.json, used when no file is found on disk
const BUILTIN_LANGUAGES: &str = include_str!("../../../config/languages.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandTemplate {
    /// Substitute `{source}` and `{artifact}` in the program and every argument
    pub fn render(&self, source: &Path, artifact: &Path) -> LaunchCommand {
        let source = source.to_string_lossy();
        let artifact = artifact.to_string_lossy();
        let fill = |s: &str| {
            s.replace(SOURCE_PLACEHOLDER, &source)
                .replace(ARTIFACT_PLACEHOLDER, &artifact)
        };

        LaunchCommand {
            program: fill(&self.command),
            args: self.args.iter().map(|a| fill(a)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    pub extensions: Vec<String>,
    pub kind: LanguageKind,
    #[serde(default)]
    pub compile: Option<CommandTemplate>,
    pub run: CommandTemplate,
    /// Treat any stderr output as a run error for that fixture
    #[serde(default)]
    pub stderr_is_error: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageConfig>,
}

/// Language configuration manager
#[derive(Debug, Clone)]
pub struct LanguageConfigManager {
    configs: HashMap<String, LanguageConfig>,
}

impl LanguageConfigManager {
    /// Load language configurations from a languages.json file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Language config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_json(&content)
            .with_context(|| format!("Failed to load {}", config_path.display()))
    }

    /// config/languages.json relative to the working directory, else the built-in table
    pub fn load_default() -> Result<Self> {
        let default_path = Path::new("config/languages.json");
        if default_path.exists() {
            Self::load(default_path)
        } else {
            Self::builtin()
        }
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_LANGUAGES).context("Built-in language table is invalid")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let languages_json: LanguagesJson =
            serde_json::from_str(content).context("Failed to parse languages.json")?;

        let mut configs = HashMap::new();
        for lang in languages_json.languages {
            if lang.kind == LanguageKind::Compiled && lang.compile.is_none() {
                bail!("Language '{}' is compiled but has no compile command", lang.name);
            }
            configs.insert(lang.name.to_lowercase(), lang);
        }

        Ok(Self { configs })
    }

    /// Get configuration for a language tag
    pub fn get_config(&self, language: &str) -> Result<&LanguageConfig, HarnessError> {
        self.configs
            .get(&language.to_lowercase())
            .ok_or_else(|| HarnessError::UnknownLanguage(language.to_string()))
    }

    /// Pick the language whose extension list contains the file's extension
    pub fn detect(&self, solution: &Path) -> Result<&LanguageConfig, HarnessError> {
        let ext = solution
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        // Sorted by name so a shared extension always resolves the same way
        self.languages()
            .into_iter()
            .find(|lang| lang.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
            .ok_or_else(|| {
                HarnessError::UnknownLanguage(if ext.is_empty() {
                    solution.display().to_string()
                } else {
                    format!(".{}", ext)
                })
            })
    }

    /// All configured languages, sorted by name
    pub fn languages(&self) -> Vec<&LanguageConfig> {
        let mut langs: Vec<_> = self.configs.values().collect();
        langs.sort_by(|a, b| a.name.cmp(&b.name));
        langs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_builtin_table() {
        let manager = LanguageConfigManager::builtin().unwrap();
        let names: Vec<&str> = manager.languages().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["c", "cpp", "javascript", "python", "rust"]);

        let cpp = manager.get_config("cpp").unwrap();
        assert_eq!(cpp.kind, LanguageKind::Compiled);
        assert!(cpp.compile.is_some());

        let python = manager.get_config("Python").unwrap();
        assert_eq!(python.kind, LanguageKind::Interpreted);
        assert!(!python.stderr_is_error);
    }

    #[test]
    fn test_detect_by_extension() {
        let manager = LanguageConfigManager::builtin().unwrap();
        assert_eq!(manager.detect(Path::new("sol.cpp")).unwrap().name, "cpp");
        assert_eq!(manager.detect(Path::new("/w/SOL.PY")).unwrap().name, "python");
        assert_eq!(manager.detect(Path::new("a.js")).unwrap().name, "javascript");

        let err = manager.detect(Path::new("notes.md")).unwrap_err();
        assert!(matches!(err, HarnessError::UnknownLanguage(ref e) if e == ".md"));
    }

    #[test]
    fn test_unknown_language() {
        let manager = LanguageConfigManager::builtin().unwrap();
        assert!(manager.get_config("cobol").is_err());
    }

    #[test]
    fn test_render_placeholders() {
        let template = CommandTemplate {
            command: "g++".to_string(),
            args: vec![
                "{source}".to_string(),
                "-o".to_string(),
                "{artifact}".to_string(),
            ],
        };
        let cmd = template.render(
            &PathBuf::from("/td/temp_solution.cpp"),
            &PathBuf::from("/td/solution_exec"),
        );
        assert_eq!(cmd.program, "g++");
        assert_eq!(cmd.args, vec!["/td/temp_solution.cpp", "-o", "/td/solution_exec"]);
    }

    #[test]
    fn test_shared_extension_resolves_by_name() {
        let json = r#"{"languages": [
            {"name": "python3", "extensions": ["py"], "kind": "interpreted", "run": {"command": "python3", "args": ["{source}"]}},
            {"name": "pypy", "extensions": ["py"], "kind": "interpreted", "run": {"command": "pypy3", "args": ["{source}"]}},
            {"name": "python", "extensions": ["py"], "kind": "interpreted", "run": {"command": "python", "args": ["{source}"]}}
        ]}"#;
        // Each manager gets a freshly seeded map
        for _ in 0..10 {
            let manager = LanguageConfigManager::from_json(json).unwrap();
            assert_eq!(manager.detect(Path::new("sol.py")).unwrap().name, "pypy");
        }
    }

    #[test]
    fn test_compiled_language_requires_compile_command() {
        let json = r#"{"languages": [
            {"name": "go", "extensions": ["go"], "kind": "compiled", "run": {"command": "{artifact}"}}
        ]}"#;
        assert!(LanguageConfigManager::from_json(json).is_err());
    }
}
