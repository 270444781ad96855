//! On-disk session configuration, loaded the way the reference stack's `GameConfig` is:
//! a `serde`-derived struct round-tripped through TOML via `serdeconv`.

use serde_derive::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_KEEP_ALIVE_PERIOD: Duration = Duration::from_secs(60);
pub const DEFAULT_PING_PERIOD: Duration = Duration::from_secs(30);
pub const DEFAULT_INCOMING_DRAIN_PERIOD: Duration = Duration::from_millis(10);
pub const DEFAULT_PERIODIC_SAVE_PERIOD: Duration = Duration::from_secs(60);

#[derive(Serialize, Deserialize)]
pub struct SessionConfig {
    pub realm_address: String,
    /// Carried for future negotiation; CORE only implements one header shape today.
    pub protocol_version: u16,
    pub keep_alive_enabled: bool,
    pub ping_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            realm_address: "localhost:8085".to_string(),
            protocol_version: 1,
            keep_alive_enabled: false,
            ping_enabled: false,
        }
    }
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> SessionConfig {
        serdeconv::from_toml_file(path).expect("error loading session configuration file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_has_sane_realm_address() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.realm_address, "localhost:8085");
        assert!(!cfg.keep_alive_enabled);
    }

    #[test]
    fn load_round_trips_through_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
realm_address = "realm.example:8085"
protocol_version = 2
keep_alive_enabled = true
ping_enabled = false
"#
        )
        .unwrap();

        let cfg = SessionConfig::load(file.path());
        assert_eq!(cfg.realm_address, "realm.example:8085");
        assert_eq!(cfg.protocol_version, 2);
        assert!(cfg.keep_alive_enabled);
    }
}
