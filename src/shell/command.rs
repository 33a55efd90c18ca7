use super::ShellError;

/// One shell command. A line may hold several, separated by `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Set { field: String, value: String },
    Row { index: usize, field: String, value: String },
    AddRow,
    Exercise(String),
    Refresh,
    Submit,
    Show,
    Help,
    Quit,
}

pub const HELP: &[(&str, &str)] = &[
    ("go <path>", "navigate (/, /log-session, /metrics, /analytics, /profile)"),
    ("set <field> <value>", "edit a draft field"),
    ("row <i> <field> <value>", "edit exercise row i (log-session)"),
    ("add-row", "append an exercise row (log-session)"),
    ("exercise <name>", "change the analytics filter"),
    ("refresh", "re-fetch the dashboard or analytics"),
    ("submit", "send the current draft"),
    ("show", "render the current page"),
    ("help", "this list"),
    ("quit", "leave the shell"),
];

impl Command {
    pub fn parse(input: &str) -> Result<Self, ShellError> {
        let input = input.trim();
        let (word, rest) = match input.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (input, ""),
        };

        let command = match word {
            "go" => Self::Go(required(rest, "go <path>")?.to_string()),
            "set" => {
                let (field, value) = split_field(rest, "set <field> <value>")?;
                Self::Set { field, value }
            }
            "row" => {
                let usage = "row <i> <field> <value>";
                let (index, rest) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(ShellError::Usage(usage))?;
                let index = index
                    .parse()
                    .map_err(|_| ShellError::BadRowIndex(index.to_string()))?;
                let (field, value) = split_field(rest.trim(), usage)?;
                Self::Row {
                    index,
                    field,
                    value,
                }
            }
            "add-row" => Self::AddRow,
            "exercise" => Self::Exercise(required(rest, "exercise <name>")?.to_string()),
            "refresh" => Self::Refresh,
            "submit" => Self::Submit,
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }

    /// Split a line on `;`, skipping empty segments.
    pub fn parse_line(line: &str) -> Vec<Result<Self, ShellError>> {
        line.split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(Self::parse)
            .collect()
    }
}

fn required<'a>(rest: &'a str, usage: &'static str) -> Result<&'a str, ShellError> {
    if rest.is_empty() {
        Err(ShellError::Usage(usage))
    } else {
        Ok(rest)
    }
}

/// `<field> <value>`, where the value is the rest of the input verbatim.
fn split_field(rest: &str, usage: &'static str) -> Result<(String, String), ShellError> {
    let (field, value) = rest
        .split_once(char::is_whitespace)
        .ok_or(ShellError::Usage(usage))?;
    Ok((field.to_string(), value.trim().to_string()))
}
