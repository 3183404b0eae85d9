//! Constants for the HTTP transport and configuration loader.

use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "cardgate.toml";

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "CARDGATE_CONFIG";

/// Environment variable overriding the gateway endpoint URL.
pub const URL_ENV: &str = "CARDGATE_URL";

/// Environment variable overriding the default user name.
pub const USERNAME_ENV: &str = "CARDGATE_USERNAME";

/// Environment variable overriding the default password.
pub const PASSWORD_ENV: &str = "CARDGATE_PASSWORD";

/// Environment variable overriding the default merchant identifier.
pub const MERCHANT_ENV: &str = "CARDGATE_MERCHANT";

/// Environment variable overriding the default terminal identifier.
pub const TERMINAL_ENV: &str = "CARDGATE_TERMINAL";
