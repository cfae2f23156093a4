use serde::{Deserialize, Serialize};

const SCHEDULE_BASE_URL: &str = "https://api-web.nhle.com/v1/club-schedule";

/// Settings for the team schedule list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    pub team: String,
}

impl ListConfig {
    pub fn is_configured(&self) -> bool {
        !self.team.trim().is_empty()
    }

    /// Week schedule endpoint for the configured team, if any. The view layer
    /// owns the actual request.
    pub fn schedule_url(&self) -> Option<String> {
        if !self.is_configured() {
            return None;
        }
        let team = self.team.trim().to_uppercase();
        Some(format!(
            "{SCHEDULE_BASE_URL}/{}/week/now",
            urlencoding::encode(&team)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_url_requires_team() {
        assert_eq!(ListConfig::default().schedule_url(), None);
        let cfg = ListConfig { team: " tor ".into() };
        assert_eq!(
            cfg.schedule_url().as_deref(),
            Some("https://api-web.nhle.com/v1/club-schedule/TOR/week/now")
        );
    }
}
