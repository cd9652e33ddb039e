use std::fmt;

use crate::config::HELP_TEXT;
use crate::core::error::DriveError;
use crate::core::navigation::NavPhase;
use crate::core::sync::ListingSync;
use crate::models::{Entry, OutputLine, PathAddress};
use crate::remote::RemoteStore;

// =============================================================================
// Path Argument Type
// =============================================================================

/// A path argument as typed by the user (e.g. `cd docs`).
///
/// Stored as-is; it becomes an address only through
/// [`resolve_target`], which uses the address primitives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathArg(String);

impl PathArg {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PathArg {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Command Enum
// =============================================================================

/// Parsed explorer command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Ls,
    Cd(PathArg),
    Pwd,
    Mkdir(String),
    Touch(String),
    Mv { from: String, to: String },
    Rm(String),
    Info(String),
    Refresh,
    Roots,
    Help,
    /// Unknown command or usage error, with the message to print.
    Unknown(String),
}

impl Command {
    /// All command names, for completion.
    pub fn names() -> &'static [&'static str] {
        &[
            "cd", "help", "info", "ls", "mkdir", "mv", "pwd", "refresh", "rm", "roots", "touch",
        ]
    }

    /// Parse a command from its name and arguments.
    pub fn parse(name: &str, args: &[String]) -> Self {
        let first = args.first().cloned();
        match name.to_lowercase().as_str() {
            "ls" => Self::Ls,
            "cd" => Self::Cd(first.map(PathArg::new).unwrap_or_else(|| PathArg::new("~"))),
            "pwd" => Self::Pwd,
            "mkdir" => first
                .map(Self::Mkdir)
                .unwrap_or_else(|| Self::Unknown("mkdir: missing operand".to_string())),
            "touch" => first
                .map(Self::Touch)
                .unwrap_or_else(|| Self::Unknown("touch: missing file operand".to_string())),
            "mv" => match args {
                [from, to] => Self::Mv {
                    from: from.clone(),
                    to: to.clone(),
                },
                _ => Self::Unknown("mv: expected <name> <new-name>".to_string()),
            },
            "rm" => first
                .map(Self::Rm)
                .unwrap_or_else(|| Self::Unknown("rm: missing operand".to_string())),
            "info" => first
                .map(Self::Info)
                .unwrap_or_else(|| Self::Unknown("info: missing operand".to_string())),
            "refresh" => Self::Refresh,
            "roots" => Self::Roots,
            "help" | "?" => Self::Help,
            _ => Self::Unknown(format!("{}: command not found", name)),
        }
    }
}

// =============================================================================
// Line Splitting
// =============================================================================

/// Error splitting a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    #[error("unclosed {0} quote")]
    UnclosedQuote(char),
}

/// Split a line into words. Single and double quotes group words containing
/// spaces; quotes themselves are dropped.
pub fn split_args(line: &str) -> Result<Vec<String>, SplitError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(SplitError::UnclosedQuote(q));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

// =============================================================================
// Execution
// =============================================================================

/// Result of executing a command.
#[derive(Clone, Debug, Default)]
pub struct CommandResult {
    pub output: Vec<OutputLine>,
}

impl CommandResult {
    pub fn output(lines: Vec<OutputLine>) -> Self {
        Self { output: lines }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    fn error(msg: impl Into<String>) -> Self {
        Self::output(vec![OutputLine::error(msg)])
    }
}

/// Resolve a user-typed path against the current location.
///
/// - `~` is the configured home
/// - anything containing `::` is an absolute address
/// - otherwise `/`-separated components are applied one by one, where `..`
///   goes up (stopping at the storage root) and `.` stays
pub fn resolve_target(
    current: &PathAddress,
    home: &PathAddress,
    arg: &PathArg,
) -> Result<PathAddress, DriveError> {
    let raw = arg.as_str();
    if raw == "~" {
        return Ok(home.clone());
    }
    if raw.contains(crate::config::ADDRESS_SEPARATOR) {
        return Ok(PathAddress::parse(raw)?);
    }

    let mut resolved = current.clone();
    for part in raw.split('/').filter(|s| !s.is_empty()) {
        resolved = match part {
            "." => resolved,
            ".." => resolved.parent().unwrap_or(resolved),
            name => resolved.join(name)?,
        };
    }
    Ok(resolved)
}

/// Parse and execute one line of input.
pub async fn run_line<C: RemoteStore>(line: &str, sync: &ListingSync<C>) -> CommandResult {
    let words = match split_args(line) {
        Ok(words) => words,
        Err(err) => return CommandResult::error(format!("syntax error: {}", err)),
    };
    let Some((name, args)) = words.split_first() else {
        return CommandResult::empty();
    };
    execute(Command::parse(name, args), sync).await
}

/// Execute a parsed command against a view.
pub async fn execute<C: RemoteStore>(cmd: Command, sync: &ListingSync<C>) -> CommandResult {
    match cmd {
        Command::Ls => list(sync),

        Command::Cd(path) => {
            let target = match resolve_target(&sync.location(), sync.home(), &path) {
                Ok(target) => target,
                Err(err) => return CommandResult::error(format!("cd: {}: {}", path, err)),
            };
            match sync.open(target.clone()).await {
                Ok(()) => CommandResult::empty(),
                Err(DriveError::NotFound) => {
                    let is_file =
                        matches!(sync.client().get_file_by_path(&target).await, Ok(Some(_)));
                    let reason = if is_file { "Not a folder" } else { "No such folder" };
                    CommandResult::error(format!("cd: {}: {}", path, reason))
                }
                Err(err) => CommandResult::error(format!("cd: {}: {}", path, err)),
            }
        }

        Command::Pwd => CommandResult::output(vec![OutputLine::text(sync.location().render())]),

        Command::Mkdir(name) => match sync.create_folder(&name).await {
            Ok(folder) => CommandResult::output(vec![OutputLine::success(format!(
                "created {}",
                folder.full_path
            ))]),
            Err(err) => CommandResult::error(format!("mkdir: {}: {}", name, err)),
        },

        Command::Touch(name) => match sync.create_file(&name).await {
            Ok(_) => CommandResult::empty(),
            Err(err) => CommandResult::error(format!("touch: {}: {}", name, err)),
        },

        Command::Mv { from, to } => {
            let Some(entry) = find_entry(sync, &from) else {
                return CommandResult::error(format!("mv: {}: No such file or folder", from));
            };
            match sync.rename(&entry, &to).await {
                Ok(()) => CommandResult::empty(),
                Err(err) => CommandResult::error(format!("mv: {}: {}", from, err)),
            }
        }

        Command::Rm(name) => {
            let Some(entry) = find_entry(sync, &name) else {
                return CommandResult::error(format!("rm: {}: No such file or folder", name));
            };
            match sync.delete(&entry).await {
                Ok(()) => CommandResult::empty(),
                Err(err) => CommandResult::error(format!("rm: {}: {}", name, err)),
            }
        }

        Command::Info(name) => {
            let Some(entry) = find_entry(sync, &name) else {
                return CommandResult::error(format!("info: {}: No such file or folder", name));
            };
            match sync.inspect(&entry).await {
                Ok(fresh) => CommandResult::output(describe(&fresh)),
                Err(err) => CommandResult::error(format!("info: {}: {}", name, err)),
            }
        }

        Command::Refresh => match sync.refresh().await {
            Ok(()) => list(sync),
            Err(err) => CommandResult::error(format!("refresh: {}", err)),
        },

        Command::Roots => CommandResult::output(
            sync.storage()
                .roots()
                .map(|root| OutputLine::folder_entry(root.render()))
                .collect(),
        ),

        Command::Help => {
            CommandResult::output(HELP_TEXT.lines().map(OutputLine::text).collect())
        }

        Command::Unknown(msg) => CommandResult::error(msg),
    }
}

fn find_entry<C: RemoteStore>(sync: &ListingSync<C>, name: &str) -> Option<Entry> {
    sync.navigator().listing()?.find_by_name(name)
}

fn describe(entry: &Entry) -> Vec<OutputLine> {
    let mut lines = vec![
        OutputLine::text(format!("path: {}", entry.full_path())),
        OutputLine::text(format!("id: {}", entry.id())),
    ];
    match entry {
        Entry::Folder(folder) => lines.push(OutputLine::text(format!(
            "contains: {} folders, {} files",
            folder.child_folder_ids.len(),
            folder.file_ids.len()
        ))),
        Entry::File(file) => {
            lines.push(OutputLine::text(format!("storage: {}", file.storage_tag)));
            lines.push(OutputLine::text(format!("version: {}", file.version)));
        }
    }
    if !entry.tags().is_empty() {
        lines.push(OutputLine::text(format!("tags: {}", entry.tags().join(", "))));
    }
    lines
}

fn list<C: RemoteStore>(sync: &ListingSync<C>) -> CommandResult {
    let view = sync.snapshot();
    let mut lines = Vec::new();

    match (&view.phase, &view.listing) {
        (NavPhase::Loading(_), None) => lines.push(OutputLine::info("loading...")),
        (NavPhase::Failed(err), _) => lines.push(OutputLine::error(format!("ls: {}", err))),
        _ => {}
    }

    if let Some(listing) = &view.listing {
        if view.stale {
            lines.push(OutputLine::info("(showing last known listing)"));
        }
        for entry in listing.sorted() {
            lines.push(match entry {
                Entry::Folder(f) => OutputLine::folder_entry(f.name),
                Entry::File(f) => OutputLine::file_entry(f.name),
            });
        }
    }

    CommandResult::output(lines)
}
