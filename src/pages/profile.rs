use super::{Call, Line, SubmitError, Submission, form_lines};
use crate::api::ClientError;
use crate::context::UserContext;
use crate::form::{FormError, apply_edit, validate_record};
use crate::schema::{ProfileUpdate, UserProfile};

const LOAD_FALLBACK: &str = "Failed to load profile";
const SAVE_FALLBACK: &str = "Failed to save profile";

/// Profile editor. The draft starts from defaults and is replaced once the
/// stored profile arrives.
#[derive(Debug)]
pub struct ProfilePage {
    ctx: UserContext,
    draft: ProfileUpdate,
    loaded: bool,
    submission: Submission,
}

impl ProfilePage {
    pub fn mount(ctx: UserContext) -> (Self, Call) {
        let page = Self {
            ctx,
            draft: ProfileUpdate::default(),
            loaded: false,
            submission: Submission::default(),
        };
        (page, Call::Profile)
    }

    pub fn draft(&self) -> &ProfileUpdate {
        &self.draft
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Whether the stored profile has replaced the default draft.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// One-time profile fetch.
    pub fn deliver_profile(&mut self, result: Result<UserProfile, ClientError>) {
        match result {
            Ok(profile) => {
                self.draft = ProfileUpdate::from(&profile);
                self.loaded = true;
            }
            Err(err) => self.submission.note(err.user_message(LOAD_FALLBACK)),
        }
    }

    pub fn edit(&mut self, field: &str, raw: &str) -> Result<(), FormError> {
        apply_edit(&mut self.draft, field, raw)?;
        self.submission.touch();
        Ok(())
    }

    /// Saving is refused until the stored profile is in, so the defaults
    /// never overwrite it.
    pub fn begin_submit(&mut self) -> Result<Call, SubmitError> {
        if !self.loaded {
            return Err(SubmitError::NotLoaded);
        }
        self.submission.begin(validate_record(&self.draft, ""))?;
        Ok(Call::UpdateProfile(self.draft.clone()))
    }

    pub fn finish_submit(&mut self, result: Result<UserProfile, ClientError>) {
        self.submission
            .finish(result, |_| "Profile saved".to_string(), SAVE_FALLBACK);
    }

    pub fn render(&self) -> Vec<Line> {
        let mut lines = vec![Line::Heading(format!("Profile (user #{})", self.ctx.user_id))];
        if !self.loaded {
            lines.push(Line::Notice(
                "Showing defaults; saving is disabled until the stored profile loads".to_string(),
            ));
        }
        lines.extend(form_lines(&self.draft));
        lines.extend(self.submission.lines());
        lines
    }
}
