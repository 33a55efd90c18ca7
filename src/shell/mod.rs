//! Application shell: route table, page mounting and the call queue.
//!
//! The shell owns exactly one mounted page. Pages hand back [`Call`]s; the
//! shell queues them tagged with the mount's generation and [`Shell::pump`]
//! runs them against the [`CoachApi`]. Navigating away bumps the generation,
//! drops whatever the old page still had queued, and any reply carrying an
//! older generation is discarded on delivery.

mod command;
mod route;

pub use command::{Command, HELP};
pub use route::Route;

use std::collections::VecDeque;

use chrono::NaiveDate;
use thiserror::Error;

use crate::api::CoachApi;
use crate::context::UserContext;
use crate::form::FormError;
use crate::pages::{
    AnalyticsPage, Call, DashboardPage, Line, LogSessionPage, MetricsPage, ProfilePage, Reply,
    SubmitError, Submission,
};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a row number")]
    BadRowIndex(String),

    #[error("'{command}' is not available on {page}")]
    NotOnThisPage {
        command: &'static str,
        page: &'static str,
    },

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// The mounted page.
#[derive(Debug)]
pub enum Page {
    Dashboard(DashboardPage),
    LogSession(LogSessionPage),
    Metrics(MetricsPage),
    Analytics(AnalyticsPage),
    Profile(ProfilePage),
}

impl Page {
    /// Submission state of a draft page; `None` for read pages.
    pub fn submission(&self) -> Option<&Submission> {
        match self {
            Self::LogSession(page) => Some(page.submission()),
            Self::Metrics(page) => Some(page.submission()),
            Self::Profile(page) => Some(page.submission()),
            Self::Dashboard(_) | Self::Analytics(_) => None,
        }
    }
}

/// Whether the shell should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
struct Pending {
    generation: u64,
    call: Call,
}

pub struct Shell<'a> {
    api: &'a dyn CoachApi,
    ctx: UserContext,
    default_exercise: String,
    today: NaiveDate,
    route: Route,
    page: Page,
    generation: u64,
    queue: VecDeque<Pending>,
}

impl<'a> Shell<'a> {
    /// Open the shell on the dashboard. Its fetch is queued, not yet run.
    pub fn new(api: &'a dyn CoachApi, ctx: UserContext, default_exercise: impl Into<String>) -> Self {
        let (page, call) = DashboardPage::mount(ctx);
        let mut shell = Self {
            api,
            ctx,
            default_exercise: default_exercise.into(),
            today: chrono::Local::now().date_naive(),
            route: Route::Dashboard,
            page: Page::Dashboard(page),
            generation: 0,
            queue: VecDeque::new(),
        };
        shell.enqueue(call);
        shell
    }

    /// Date new session and metrics drafts default to.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Tear down the current page and mount the one `path` resolves to.
    pub fn navigate(&mut self, path: &str) -> Route {
        let route = Route::resolve(path);
        self.mount(route);
        route
    }

    fn mount(&mut self, route: Route) {
        self.generation += 1;
        let current = self.generation;
        self.queue.retain(|pending| pending.generation == current);

        let ctx = self.ctx;
        let (page, call) = match route {
            Route::Dashboard => {
                let (page, call) = DashboardPage::mount(ctx);
                (Page::Dashboard(page), Some(call))
            }
            Route::Analytics => {
                let (page, call) = AnalyticsPage::mount(ctx, self.default_exercise.clone());
                (Page::Analytics(page), Some(call))
            }
            Route::Profile => {
                let (page, call) = ProfilePage::mount(ctx);
                (Page::Profile(page), Some(call))
            }
            Route::LogSession => (Page::LogSession(LogSessionPage::new(ctx, self.today)), None),
            Route::Metrics => (Page::Metrics(MetricsPage::new(ctx, self.today)), None),
        };
        self.route = route;
        self.page = page;
        if let Some(call) = call {
            self.enqueue(call);
        }
    }

    fn enqueue(&mut self, call: Call) {
        self.queue.push_back(Pending {
            generation: self.generation,
            call,
        });
    }

    /// Run every queued call and deliver the replies. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut ran = 0;
        while let Some(pending) = self.queue.pop_front() {
            let reply = pending.call.execute(self.api);
            self.deliver(pending.generation, reply);
            ran += 1;
        }
        ran
    }

    /// Hand a reply to the mounted page. Replies from an earlier mount, or
    /// for an operation the page never asked for, are dropped.
    pub fn deliver(&mut self, generation: u64, reply: Reply) -> bool {
        if generation != self.generation {
            return false;
        }
        match (&mut self.page, reply) {
            (Page::Dashboard(page), Reply::Dashboard(result)) => page.deliver(result),
            (Page::Analytics(page), Reply::Analytics(result)) => page.deliver(result),
            (Page::Profile(page), Reply::Profile(result)) => page.deliver_profile(result),
            (Page::Profile(page), Reply::ProfileSaved(result)) => page.finish_submit(result),
            (Page::LogSession(page), Reply::SessionLogged(result)) => page.finish_submit(result),
            (Page::Metrics(page), Reply::MetricsUpdated(result)) => page.finish_submit(result),
            _ => return false,
        }
        true
    }

    /// Apply one command. Calls it produces are queued, not run.
    pub fn execute(&mut self, command: Command) -> Result<Flow, ShellError> {
        match command {
            Command::Go(path) => {
                self.navigate(&path);
            }
            Command::Set { field, value } => match &mut self.page {
                Page::LogSession(page) => page.edit_metric(&field, &value)?,
                Page::Metrics(page) => page.edit(&field, &value)?,
                Page::Profile(page) => page.edit(&field, &value)?,
                _ => return Err(self.unavailable("set")),
            },
            Command::Row {
                index,
                field,
                value,
            } => match &mut self.page {
                Page::LogSession(page) => page.edit_row(index, &field, &value)?,
                _ => return Err(self.unavailable("row")),
            },
            Command::AddRow => match &mut self.page {
                Page::LogSession(page) => {
                    page.add_row();
                }
                _ => return Err(self.unavailable("add-row")),
            },
            Command::Exercise(name) => match &mut self.page {
                Page::Analytics(page) => page.set_exercise(name),
                _ => return Err(self.unavailable("exercise")),
            },
            Command::Refresh => match &mut self.page {
                Page::Analytics(page) => {
                    let call = page.refresh();
                    self.enqueue(call);
                }
                Page::Dashboard(_) => self.mount(Route::Dashboard),
                _ => return Err(self.unavailable("refresh")),
            },
            Command::Submit => {
                let call = match &mut self.page {
                    Page::LogSession(page) => page.begin_submit()?,
                    Page::Metrics(page) => page.begin_submit()?,
                    Page::Profile(page) => page.begin_submit()?,
                    _ => return Err(self.unavailable("submit")),
                };
                self.enqueue(call);
            }
            Command::Show | Command::Help => {}
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Run every command on a line, then pump the queue once.
    pub fn execute_line(&mut self, line: &str) -> Vec<Result<Flow, ShellError>> {
        let mut results = Vec::new();
        for parsed in Command::parse_line(line) {
            let result = parsed.and_then(|command| self.execute(command));
            let quit = matches!(result, Ok(Flow::Quit));
            results.push(result);
            if quit {
                break;
            }
        }
        self.pump();
        results
    }

    fn unavailable(&self, command: &'static str) -> ShellError {
        ShellError::NotOnThisPage {
            command,
            page: self.route.label(),
        }
    }

    /// Navigation bar with the current route in brackets.
    pub fn nav(&self) -> Line {
        let links: Vec<String> = Route::ALL
            .iter()
            .map(|route| {
                if *route == self.route {
                    format!("[{}]", route.label())
                } else {
                    route.label().to_string()
                }
            })
            .collect();
        Line::Text(links.join(" | "))
    }

    /// The mounted page's lines, without navigation.
    pub fn render_page(&self) -> Vec<Line> {
        match &self.page {
            Page::Dashboard(page) => page.render(),
            Page::LogSession(page) => page.render(),
            Page::Metrics(page) => page.render(),
            Page::Analytics(page) => page.render(),
            Page::Profile(page) => page.render(),
        }
    }

    pub fn render(&self) -> Vec<Line> {
        let mut lines = vec![self.nav()];
        lines.extend(self.render_page());
        lines
    }
}
