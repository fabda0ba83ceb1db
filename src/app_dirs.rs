use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "precision-timer";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("precision_timer_config.json"))
    }

    pub fn log_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
                .join("precision-timer.log")
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|pd| pd.data_local_dir().join("precision-timer.log"))
                .unwrap_or_else(|| PathBuf::from("precision-timer.log"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_have_expected_file_names() {
        assert_eq!(
            AppDirs::config_path().extension().and_then(|n| n.to_str()),
            Some("json")
        );
        assert_eq!(
            AppDirs::log_path().file_name().and_then(|n| n.to_str()),
            Some("precision-timer.log")
        );
    }
}
