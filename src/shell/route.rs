/// Client-side route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    LogSession,
    Metrics,
    Analytics,
    Profile,
}

impl Route {
    /// Navigation order.
    pub const ALL: [Route; 5] = [
        Self::Dashboard,
        Self::LogSession,
        Self::Metrics,
        Self::Analytics,
        Self::Profile,
    ];

    /// Resolve a path. Anything unknown redirects to the dashboard.
    pub fn resolve(path: &str) -> Self {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self::ALL
            .into_iter()
            .find(|route| route.path() == normalized)
            .unwrap_or(Self::Dashboard)
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::LogSession => "/log-session",
            Self::Metrics => "/metrics",
            Self::Analytics => "/analytics",
            Self::Profile => "/profile",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::LogSession => "Log Session",
            Self::Metrics => "Metrics",
            Self::Analytics => "Analytics",
            Self::Profile => "Profile",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths_resolve() {
        for route in Route::ALL {
            assert_eq!(Route::resolve(route.path()), route);
        }
    }

    #[test]
    fn trailing_slash_and_missing_leading_slash_are_tolerated() {
        assert_eq!(Route::resolve("/metrics/"), Route::Metrics);
        assert_eq!(Route::resolve("analytics"), Route::Analytics);
        assert_eq!(Route::resolve("/profile?tab=1"), Route::Profile);
    }

    #[test]
    fn unknown_paths_redirect_to_dashboard() {
        assert_eq!(Route::resolve("/settings"), Route::Dashboard);
        assert_eq!(Route::resolve(""), Route::Dashboard);
        assert_eq!(Route::resolve("/log-session/extra"), Route::Dashboard);
    }
}
