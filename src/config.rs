use std::time::Duration;

use crate::error::{Result, SpecsError};

/// Root Drive folder holding one sub-folder per team.
pub const TEAMS_FOLDER_ID: &str = "19jxxVn_3n6ZAmFl3DReEVgZjxZnlky4X";
/// Spreadsheet acting as the system of record for spec metadata.
pub const TRACKER_SPREADSHEET_ID: &str = "1aKH6petyrzjzw0mgUNQscDhFSfVkbAIEjfH7YBS-bDA";

const CACHE_TTL_SECS: u64 = 30 * 60;
const CACHE_CAPACITY: usize = 128;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_port: String,
    pub host: String,
    pub app_env: String,
    pub log_level: String,
    pub custom_base_url: String,

    pub specs_file: String,
    pub teams_folder_id: String,
    pub tracker_spreadsheet_id: String,
    pub specs_sheet_title: String,
    pub tmp_sheet_title: String,

    pub google_access_token: Option<String>,
    pub google_oauth_client_id: Option<String>,
    pub google_oauth_client_secret: Option<String>,

    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

/// How a single setting is resolved.
struct Setting<'a> {
    name: &'a str,
    default: Option<&'a str>,
    enums: &'a [&'a str],
}

impl<'a> Setting<'a> {
    fn new(name: &'a str) -> Self {
        Setting {
            name,
            default: None,
            enums: &[],
        }
    }

    fn default(mut self, value: &'a str) -> Self {
        self.default = Some(value);
        self
    }

    fn one_of(mut self, enums: &'a [&'a str]) -> Self {
        self.enums = enums;
        self
    }
}

impl Config {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    ///
    /// Every setting is searched under the spellings produced by
    /// [`env_key_variations`]; the first non-empty value wins.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |setting: Setting| resolve(&lookup, setting);
        let optional = |name: &str| lookup_any(&lookup, name);

        let cache_ttl_secs = parse_number(
            "CacheTtlSecs",
            &get(Setting::new("CacheTtlSecs").default(&CACHE_TTL_SECS.to_string()))?,
        )?;
        let cache_capacity = parse_number(
            "CacheCapacity",
            &get(Setting::new("CacheCapacity").default(&CACHE_CAPACITY.to_string()))?,
        )?;

        Ok(Config {
            app_port: get(Setting::new("AppPort").default("8000"))?,
            host: get(Setting::new("Host").default("localhost"))?,
            app_env: get(Setting::new("AppEnv")
                .default("development")
                .one_of(&["development", "production"]))?,
            log_level: get(Setting::new("LogLevel")
                .default("debug")
                .one_of(&["debug", "info", "warn", "error"]))?,
            custom_base_url: get(Setting::new("CustomBaseUrl").default("http://localhost:8000"))?,
            specs_file: get(Setting::new("SpecsFile").default("specs.json"))?,
            teams_folder_id: get(Setting::new("TeamsFolderId").default(TEAMS_FOLDER_ID))?,
            tracker_spreadsheet_id: get(
                Setting::new("TrackerSpreadsheetId").default(TRACKER_SPREADSHEET_ID),
            )?,
            specs_sheet_title: get(Setting::new("SpecsSheetTitle").default("Specs"))?,
            tmp_sheet_title: get(Setting::new("TmpSheetTitle").default("Specs_tmp"))?,
            google_access_token: optional("GoogleAccessToken"),
            google_oauth_client_id: optional("GoogleOauthClientId"),
            google_oauth_client_secret: optional("GoogleOauthClientSecret"),
            cache_ttl_secs,
            cache_capacity: cache_capacity as usize,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.app_port)
    }

    /// OAuth redirect target, derived from the public base URL.
    pub fn callback_url(&self) -> String {
        format!(
            "{}/auth/google/callback",
            self.custom_base_url.trim_end_matches('/')
        )
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn resolve<F>(lookup: &F, setting: Setting) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup_any(lookup, setting.name) {
        Some(value) => value,
        None => match setting.default {
            Some(default) => default.to_string(),
            None => {
                return Err(SpecsError::Config(format!(
                    "required environment variable {} is not set",
                    format_env_key(setting.name)
                )));
            }
        },
    };

    if !setting.enums.is_empty() && !setting.enums.contains(&value.as_str()) {
        return Err(SpecsError::Config(format!(
            "environment variable {} must be one of {:?}",
            format_env_key(setting.name),
            setting.enums
        )));
    }

    Ok(value)
}

fn lookup_any<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env_key_variations(name)
        .iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        SpecsError::Config(format!(
            "environment variable {} must be a non-negative integer",
            format_env_key(name)
        ))
    })
}

/// Every spelling a setting may appear under, in lookup order.
///
/// `AppPort` yields `AppPort`, `APPPORT`, `appport`, `app_port`, `APP_PORT`,
/// `app_port`, then the same six prefixed with `APP_`.
pub fn env_key_variations(key: &str) -> Vec<String> {
    let snake = to_snake_case(key);
    let plain = vec![
        key.to_string(),
        key.to_uppercase(),
        key.to_lowercase(),
        snake.clone(),
        snake.to_uppercase(),
        snake.to_lowercase(),
    ];
    let prefixed: Vec<String> = plain.iter().map(|k| format!("APP_{}", k)).collect();
    plain.into_iter().chain(prefixed).collect()
}

fn format_env_key(key: &str) -> String {
    to_snake_case(key).to_uppercase()
}

fn to_snake_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 4);
    let mut previous: Option<char> = None;
    for c in value.chars() {
        if c.is_uppercase() {
            if let Some(prev) = previous {
                if !prev.is_uppercase() && !result.ends_with('_') {
                    result.push('_');
                }
            }
        }
        result.extend(c.to_lowercase());
        previous = Some(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn snake_case_keeps_acronyms_together() {
        assert_eq!(to_snake_case("AppPort"), "app_port");
        assert_eq!(to_snake_case("GoogleOauthClientId"), "google_oauth_client_id");
        assert_eq!(to_snake_case("CACHE"), "cache");
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.app_port, "8000");
        assert_eq!(config.specs_sheet_title, "Specs");
        assert_eq!(config.tmp_sheet_title, "Specs_tmp");
        assert_eq!(config.cache_ttl(), Duration::from_secs(1800));
        assert_eq!(config.cache_capacity, 128);
        assert!(config.google_access_token.is_none());
        assert!(!config.is_production());
    }

    #[test]
    fn prefixed_and_snake_case_names_are_accepted() {
        let config = Config::from_lookup(lookup(&[
            ("APP_APP_PORT", "9000"),
            ("app_env", "production"),
            ("GOOGLE_ACCESS_TOKEN", "token"),
        ]))
        .unwrap();
        assert_eq!(config.app_port, "9000");
        assert!(config.is_production());
        assert_eq!(config.google_access_token.as_deref(), Some("token"));
    }

    #[test]
    fn values_outside_the_enumeration_are_rejected() {
        let err = Config::from_lookup(lookup(&[("LOG_LEVEL", "verbose")])).unwrap_err();
        assert!(err.to_string().contains("LOG_LEVEL"));
    }

    #[test]
    fn callback_url_ignores_trailing_slash() {
        let config =
            Config::from_lookup(lookup(&[("CUSTOM_BASE_URL", "https://specs.example.com/")]))
                .unwrap();
        assert_eq!(
            config.callback_url(),
            "https://specs.example.com/auth/google/callback"
        );
    }
}
