use std::collections::BTreeMap;
use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

use listscan_ocr::{CorrectionTable, EngineParams};

/// Path to a TOML config file; defaults apply when unset.
pub const CONFIG_ENV: &str = "LISTSCAN_CONFIG";
/// Overrides `bind_addr` from the environment.
pub const ADDR_ENV: &str = "LISTSCAN_ADDR";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Uploads larger than this many bytes are rejected before processing.
    pub max_upload_bytes: usize,
    pub ocr: OcrSection,
    pub parser: ParserSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".parse().expect("valid default address"),
            max_upload_bytes: 10 * 1024 * 1024,
            ocr: OcrSection::default(),
            parser: ParserSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OcrSection {
    pub lang: String,
    pub data_path: Option<String>,
    pub page_seg_mode: u32,
    /// Set to `false` to let the engine recognize any glyph.
    pub use_char_whitelist: bool,
}

impl Default for OcrSection {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            lang: params.lang,
            data_path: params.data_path,
            page_seg_mode: params.page_seg_mode,
            use_char_whitelist: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserSection {
    /// Trimmed lines shorter than this are dropped as engine noise.
    pub min_line_len: Option<usize>,
    /// Replaces the built-in correction table wholesale when present.
    pub corrections: Option<BTreeMap<String, String>>,
}

impl ServerConfig {
    /// Load from the file named by `LISTSCAN_CONFIG` (defaults when unset),
    /// then apply the `LISTSCAN_ADDR` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {path}"))?;
                toml::from_str(&raw).with_context(|| format!("parsing config file {path}"))?
            }
            Err(_) => Self::default(),
        };
        if let Ok(addr) = std::env::var(ADDR_ENV) {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("parsing {ADDR_ENV} as a socket address"))?;
        }
        Ok(config)
    }

    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            lang: self.ocr.lang.clone(),
            data_path: self.ocr.data_path.clone(),
            page_seg_mode: self.ocr.page_seg_mode,
            char_whitelist: if self.ocr.use_char_whitelist {
                EngineParams::default().char_whitelist
            } else {
                None
            },
        }
    }

    pub fn correction_table(&self) -> CorrectionTable {
        match &self.parser.corrections {
            Some(map) => CorrectionTable::new(map.iter().map(|(k, v)| (k.as_str(), v.clone()))),
            None => CorrectionTable::default(),
        }
    }

    pub fn min_line_len(&self) -> usize {
        self.parser
            .min_line_len
            .unwrap_or_else(|| listscan_ocr::PipelineOptions::default().min_line_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.min_line_len(), 3);
        assert_eq!(config.ocr.page_seg_mode, 6);
        assert!(config.engine_params().char_whitelist.is_some());
    }

    #[test]
    fn parses_partial_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
            bind_addr = "127.0.0.1:9100"

            [parser]
            min_line_len = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9100);
        assert_eq!(config.min_line_len(), 0);
        // Untouched sections keep their defaults.
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.ocr.lang, "eng");
    }

    #[test]
    fn corrections_override_replaces_builtin_table() {
        let config: ServerConfig = toml::from_str(
            r#"
            [parser.corrections]
            "Tomatoe" = "Tomato"
            "#,
        )
        .unwrap();
        let table = config.correction_table();
        assert_eq!(table.apply("Tomatoe"), "Tomato");
        assert_eq!(table.apply("Potatc"), "Potatc");
    }

    #[test]
    fn whitelist_can_be_disabled() {
        let config: ServerConfig = toml::from_str(
            r#"
            [ocr]
            use_char_whitelist = false
            "#,
        )
        .unwrap();
        assert!(config.engine_params().char_whitelist.is_none());
    }
}
