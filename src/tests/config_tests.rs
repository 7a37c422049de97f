//! tests/config_tests.rs
//! Pruebas de la configuración del proceso.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use crate::config::bridge_config::{BridgeConfig, DEFAULT_MAX_FRAME_BYTES};

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<BridgeConfig> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BridgeConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9696);
        assert_eq!(config.options_override, None);
        assert_eq!(config.app_name, "Olorin Companion");
        assert_eq!(config.max_frame_bytes, DEFAULT_MAX_FRAME_BYTES);
        assert!(config.artifact_path.ends_with("printer.pdf"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BRIDGE_HOST", "0.0.0.0"),
            ("BRIDGE_PORT", "9797"),
            ("OLORIN_OPTIONS_PATH", "/etc/olorin/options.json"),
            ("BRIDGE_ARTIFACT_PATH", "/tmp/out.pdf"),
            ("WKHTMLTOPDF_PATH", "/opt/wk/bin/wkhtmltopdf"),
            ("BRIDGE_MAX_FRAME_BYTES", "1024"),
        ])
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9797);
        assert_eq!(
            config.options_override,
            Some(PathBuf::from("/etc/olorin/options.json"))
        );
        assert_eq!(config.artifact_path, PathBuf::from("/tmp/out.pdf"));
        assert_eq!(
            config.wkhtmltopdf_path,
            Some(PathBuf::from("/opt/wk/bin/wkhtmltopdf"))
        );
        assert_eq!(config.max_frame_bytes, 1024);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = load(&[("OLORIN_OPTIONS_PATH", "  "), ("BRIDGE_PORT", "")]).unwrap();
        assert_eq!(config.options_override, None);
        assert_eq!(config.port, 9696);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(load(&[("BRIDGE_PORT", "ninety")]).is_err());
        assert!(load(&[("BRIDGE_MAX_FRAME_BYTES", "-1")]).is_err());
    }
}
