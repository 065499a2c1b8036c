//! Contact service configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CONTACT_EMAIL: &str = "hello@newportpembury.com.au";
pub const DEFAULT_CONTACT_NAME: &str = "Newport Pembury & Co";
pub const DEFAULT_FROM_EMAIL: &str = "noreply@newportpembury.com.au";
pub const DEFAULT_FROM_NAME: &str = "Newport Pembury Website";
pub const DEFAULT_MAIL_API_URL: &str = "https://api.mailchannels.net/tx/v1/send";
pub const DEFAULT_SITE_NAME: &str = "newportpembury.com.au";
pub const DEFAULT_MAIL_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAIL_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used.
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactConfig {
    pub port: u16,
    /// Where submissions are delivered.
    pub recipient_email: String,
    pub recipient_name: String,
    /// Address quoted to visitors when delivery fails.
    pub public_email: String,
    pub from_email: String,
    pub from_name: String,
    pub mail_api_url: String,
    pub mail_api_key: Option<String>,
    /// Shown in the footer of every notification.
    pub site_name: String,
    pub timeouts: MailTimeouts,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            recipient_email: DEFAULT_CONTACT_EMAIL.to_owned(),
            recipient_name: DEFAULT_CONTACT_NAME.to_owned(),
            public_email: DEFAULT_CONTACT_EMAIL.to_owned(),
            from_email: DEFAULT_FROM_EMAIL.to_owned(),
            from_name: DEFAULT_FROM_NAME.to_owned(),
            mail_api_url: DEFAULT_MAIL_API_URL.to_owned(),
            mail_api_key: None,
            site_name: DEFAULT_SITE_NAME.to_owned(),
            timeouts: MailTimeouts {
                request_secs: DEFAULT_MAIL_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_MAIL_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

impl ContactConfig {
    /// Build typed config from the process environment.
    ///
    /// Every variable is optional:
    /// - `PORT`: default 3000
    /// - `CONTACT_EMAIL`: submission recipient
    /// - `CONTACT_NAME`: recipient display name
    /// - `CONTACT_PUBLIC_EMAIL`: fallback address quoted in failure messages
    /// - `MAIL_FROM_EMAIL` / `MAIL_FROM_NAME`: fixed sender
    /// - `MAIL_API_URL`: MailChannels-compatible send endpoint
    /// - `MAIL_API_KEY`: sent as `X-Api-Key` when set
    /// - `SITE_NAME`: footer text
    /// - `MAIL_REQUEST_TIMEOUT_SECS`: default 30
    /// - `MAIL_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            port: parse_var(&get, "PORT", defaults.port)?,
            recipient_email: get("CONTACT_EMAIL").unwrap_or(defaults.recipient_email),
            recipient_name: get("CONTACT_NAME").unwrap_or(defaults.recipient_name),
            public_email: get("CONTACT_PUBLIC_EMAIL").unwrap_or(defaults.public_email),
            from_email: get("MAIL_FROM_EMAIL").unwrap_or(defaults.from_email),
            from_name: get("MAIL_FROM_NAME").unwrap_or(defaults.from_name),
            mail_api_url: get("MAIL_API_URL").unwrap_or(defaults.mail_api_url),
            mail_api_key: get("MAIL_API_KEY"),
            site_name: get("SITE_NAME").unwrap_or(defaults.site_name),
            timeouts: MailTimeouts {
                request_secs: parse_var(&get, "MAIL_REQUEST_TIMEOUT_SECS", defaults.timeouts.request_secs)?,
                connect_secs: parse_var(&get, "MAIL_CONNECT_TIMEOUT_SECS", defaults.timeouts.connect_secs)?,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}
