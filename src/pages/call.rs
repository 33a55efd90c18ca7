use crate::api::{ClientError, CoachApi};
use crate::schema::{
    AnalyticsResponse, DailyMetricsUpdate, DashboardResponse, MetricsUpdated, ProfileUpdate,
    SessionInput, SessionLogged, UserId, UserProfile,
};

/// An API call a page wants made.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Dashboard { user_id: UserId },
    Analytics { user_id: UserId, exercise: String },
    Profile,
    LogSession(SessionInput),
    UpdateMetrics(DailyMetricsUpdate),
    UpdateProfile(ProfileUpdate),
}

/// The result of a [`Call`], tagged with the operation it answers.
#[derive(Debug)]
pub enum Reply {
    Dashboard(Result<DashboardResponse, ClientError>),
    Analytics(Result<AnalyticsResponse, ClientError>),
    Profile(Result<UserProfile, ClientError>),
    SessionLogged(Result<SessionLogged, ClientError>),
    MetricsUpdated(Result<MetricsUpdated, ClientError>),
    ProfileSaved(Result<UserProfile, ClientError>),
}

impl Call {
    /// Run the call against `api`. Blocks until the response is in.
    pub fn execute(&self, api: &dyn CoachApi) -> Reply {
        match self {
            Self::Dashboard { user_id } => Reply::Dashboard(api.get_dashboard(*user_id)),
            Self::Analytics { user_id, exercise } => {
                Reply::Analytics(api.get_analytics(*user_id, exercise))
            }
            Self::Profile => Reply::Profile(api.get_profile()),
            Self::LogSession(payload) => Reply::SessionLogged(api.log_session(payload)),
            Self::UpdateMetrics(payload) => Reply::MetricsUpdated(api.update_metrics(payload)),
            Self::UpdateProfile(payload) => Reply::ProfileSaved(api.update_profile(payload)),
        }
    }
}
