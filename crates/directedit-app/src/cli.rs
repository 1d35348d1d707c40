//! Headless driver: apply edits to a page fixture and print the export.

use crate::toolkit::{PanelAction, Toolkit, ToolkitEvent};
use directedit_core::{
    Clipboard, DirectEditConfig, DomError, KeyInput, MemoryDom, Modifiers, PrefsStorage,
};
use directedit_render::SvgRenderer;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const USAGE: &str = "usage: direct-edit [--config FILE] [--json] [--copy] [--overlays] \
<fixture.json> <element-id> [property=value ...]";

/// Environment variable that switches the toolkit on or off.
pub const ENABLE_VAR: &str = "DIRECT_EDIT";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}\n{usage}", usage = USAGE)]
    Usage(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("No element with id \"{0}\" in the fixture")]
    NotFound(String),
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub fixture: PathBuf,
    pub element: String,
    /// `(property, value)` pairs in command-line order.
    pub edits: Vec<(String, String)>,
    pub json: bool,
    pub copy: bool,
    pub overlays: bool,
    pub help: bool,
}

impl CliArgs {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, CliError> {
        let mut parsed = CliArgs::default();
        let mut positional = Vec::new();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "--json" => parsed.json = true,
                "--copy" => parsed.copy = true,
                "--overlays" => parsed.overlays = true,
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| CliError::Usage("--config needs a file".to_string()))?;
                    parsed.config = Some(PathBuf::from(path));
                }
                flag if flag.starts_with("--") => {
                    return Err(CliError::Usage(format!("Unknown flag {}", flag)));
                }
                _ => positional.push(arg),
            }
        }
        if parsed.help {
            return Ok(parsed);
        }

        let mut positional = positional.into_iter();
        parsed.fixture = positional
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| CliError::Usage("Missing fixture".to_string()))?;
        parsed.element = positional
            .next()
            .map(|id| id.trim_start_matches('#').to_string())
            .ok_or_else(|| CliError::Usage("Missing element id".to_string()))?;
        for edit in positional {
            let (property, value) = edit
                .split_once('=')
                .ok_or_else(|| CliError::Usage(format!("Expected property=value, got {}", edit)))?;
            parsed.edits.push((property.trim().to_string(), value.trim().to_string()));
        }
        Ok(parsed)
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply an `on`/`off` style environment value to the gate.
pub fn apply_env_gate(config: &mut DirectEditConfig, value: Option<&str>) {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "on" | "yes") => config.enabled = true,
        Some("0" | "false" | "off" | "no") => config.enabled = false,
        Some(other) => log::warn!("Ignoring {}={}", ENABLE_VAR, other),
        None => {}
    }
}

/// Load the configuration file, if any, and apply the environment gate.
pub fn load_config(args: &CliArgs, env: Option<&str>) -> Result<DirectEditConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => DirectEditConfig::from_json(&read(path)?)?,
        None => DirectEditConfig::default(),
    };
    apply_env_gate(&mut config, env);
    Ok(config)
}

/// Run the edits and return what should be printed.
pub fn run<S: PrefsStorage, C: Clipboard>(
    args: &CliArgs,
    config: DirectEditConfig,
    storage: S,
    clipboard: C,
) -> Result<String, CliError> {
    if !config.enabled {
        return Ok(format!(
            "Direct Edit is disabled; set {}=1 to enable it",
            ENABLE_VAR
        ));
    }

    let dom = MemoryDom::from_json(&read(&args.fixture)?)?;
    let element = dom
        .find_by_id(&args.element)
        .ok_or_else(|| CliError::NotFound(args.element.clone()))?;
    let toggle = KeyInput::pressed(config.toggle_key.clone(), Modifiers::ctrl());

    let mut toolkit = Toolkit::new(dom, config, storage, clipboard, SvgRenderer::new());
    toolkit.handle_event(ToolkitEvent::Key(toggle));
    toolkit.editor_mut().select_element(element);

    for (property, value) in &args.edits {
        let applied = toolkit.editor_mut().apply_declaration(property, value)?;
        if !applied {
            log::warn!("Skipped unsupported property {}", property);
        }
    }
    toolkit.redraw();

    let mut out = String::new();
    match toolkit.editor().export_summary() {
        Some(summary) if args.json => out.push_str(&summary.to_json()?),
        Some(summary) => out.push_str(&summary.to_text()),
        None => out.push_str("No pending edits"),
    }
    if args.copy {
        let response = toolkit.handle_event(ToolkitEvent::Panel(PanelAction::Export));
        if response.copied == Some(true) {
            out.push_str("\n\nCopied to clipboard");
        }
    }
    if args.overlays {
        out.push_str("\n\n");
        out.push_str(toolkit.renderer().markup());
    }
    toolkit.shutdown();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use directedit_core::{MemoryClipboard, MemoryPrefs};
    use std::io::Write;

    const PAGE: &str = r#"{
        "viewport": [1024, 768],
        "body": {
            "tag": "body",
            "children": [
                { "tag": "div", "id": "card", "classes": ["shadow"], "rect": [40, 40, 400, 200] }
            ]
        }
    }"#;

    fn args(list: &[&str]) -> Result<CliArgs, CliError> {
        CliArgs::parse(list.iter().map(|s| s.to_string()))
    }

    fn fixture() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PAGE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["--json", "page.json", "#card", "padding-top=24px", "color = red"]).unwrap();
        assert!(parsed.json);
        assert_eq!(parsed.element, "card");
        assert_eq!(
            parsed.edits,
            vec![
                ("padding-top".to_string(), "24px".to_string()),
                ("color".to_string(), "red".to_string()),
            ]
        );

        assert!(matches!(args(&["page.json"]), Err(CliError::Usage(_))));
        assert!(matches!(args(&["page.json", "card", "oops"]), Err(CliError::Usage(_))));
        assert!(matches!(args(&["--verbose"]), Err(CliError::Usage(_))));
        assert!(args(&["--help"]).unwrap().help);
    }

    #[test]
    fn test_env_gate() {
        let mut config = DirectEditConfig::default();
        apply_env_gate(&mut config, Some("1"));
        assert!(config.enabled);
        apply_env_gate(&mut config, Some("off"));
        assert!(!config.enabled);
        apply_env_gate(&mut config, Some("maybe"));
        assert!(!config.enabled);
    }

    #[test]
    fn test_run_prints_export() {
        let file = fixture();
        let path = file.path().to_string_lossy().to_string();
        let parsed = args(&[&path, "card", "padding-top=24px"]).unwrap();

        let out = run(
            &parsed,
            DirectEditConfig::default().enabled(),
            MemoryPrefs::new(),
            MemoryClipboard::new(),
        )
        .unwrap();
        assert_eq!(out, "div#card.shadow\npadding-top: 24px;\n\nTailwind: pt-6");
    }

    #[test]
    fn test_run_copy_and_overlays() {
        let file = fixture();
        let path = file.path().to_string_lossy().to_string();
        let parsed = args(&["--copy", "--overlays", &path, "card", "border-radius=9999px"]).unwrap();

        let out = run(
            &parsed,
            DirectEditConfig::default().enabled(),
            MemoryPrefs::new(),
            MemoryClipboard::new(),
        )
        .unwrap();
        assert!(out.contains("Copied to clipboard"));
        assert!(out.contains(r#"data-direct-edit-overlay="selection""#));
    }

    #[test]
    fn test_run_disabled_and_missing_element() {
        let file = fixture();
        let path = file.path().to_string_lossy().to_string();

        let mut config = DirectEditConfig::default();
        config.enabled = false;
        let out = run(
            &args(&[&path, "card"]).unwrap(),
            config,
            MemoryPrefs::new(),
            MemoryClipboard::new(),
        )
        .unwrap();
        assert!(out.contains("disabled"));

        let result = run(
            &args(&[&path, "missing"]).unwrap(),
            DirectEditConfig::default().enabled(),
            MemoryPrefs::new(),
            MemoryClipboard::new(),
        );
        assert!(matches!(result, Err(CliError::NotFound(_))));
    }
}
