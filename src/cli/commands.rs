use crate::cli::args::Widget;
use thiserror::Error;

/// 沙盒命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxCommand {
    /// 新建文件，未指定名称时随机挑选
    Touch(Option<String>),
    /// 暂存，空列表表示 `git add .`
    Add(Vec<String>),
    Commit(String),
    Branch(String),
    Checkout(String),
    Merge(String),
}

/// 推送/拉取模拟器命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    Commit(String),
    Teammate(String),
    Push,
    Pull,
}

/// PR 流程命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowCommand {
    Next,
    Message(String),
    Title(String),
    Review(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Sandbox(SandboxCommand),
    Sync(SyncCommand),
    Flow(FlowCommand),
    Reset,
    Status,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for a list of commands")]
    Unknown(String),

    #[error("'{command}' requires {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

/// 解析一行输入，空行返回 `Ok(None)`
///
/// 允许省略或带上前缀 `git`，`commit -m "msg"` 与 `commit msg` 等价。
pub fn parse(widget: Widget, line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let line = line.strip_prefix("git ").map(str::trim_start).unwrap_or(line);
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "reset" => Command::Reset,
        "status" | "log" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => match widget {
            Widget::Sandbox => Command::Sandbox(parse_sandbox(verb, rest)?),
            Widget::Sync => Command::Sync(parse_sync(verb, rest)?),
            Widget::Pr => Command::Flow(parse_flow(verb, rest)?),
        },
    };
    Ok(Some(command))
}

fn parse_sandbox(verb: &str, rest: &str) -> Result<SandboxCommand, CommandError> {
    match verb {
        "touch" | "new" => Ok(SandboxCommand::Touch(non_empty(rest))),
        "add" => {
            let files: Vec<String> = rest
                .split_whitespace()
                .filter(|f| *f != ".")
                .map(str::to_string)
                .collect();
            Ok(SandboxCommand::Add(files))
        }
        "commit" => Ok(SandboxCommand::Commit(message_argument(rest))),
        "branch" => required(rest, "branch", "a branch name").map(SandboxCommand::Branch),
        "checkout" | "switch" => {
            // `checkout -b name` 等价于 `branch name`
            if let Some(name) = rest.strip_prefix("-b") {
                return required(name.trim(), "checkout -b", "a branch name").map(SandboxCommand::Branch);
            }
            required(rest, "checkout", "a branch name").map(SandboxCommand::Checkout)
        }
        "merge" => required(rest, "merge", "a branch name").map(SandboxCommand::Merge),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_sync(verb: &str, rest: &str) -> Result<SyncCommand, CommandError> {
    match verb {
        "commit" => Ok(SyncCommand::Commit(message_argument(rest))),
        "teammate" => Ok(SyncCommand::Teammate(message_argument(rest))),
        "push" => Ok(SyncCommand::Push),
        "pull" => Ok(SyncCommand::Pull),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_flow(verb: &str, rest: &str) -> Result<FlowCommand, CommandError> {
    match verb {
        "next" | "advance" => Ok(FlowCommand::Next),
        "message" => Ok(FlowCommand::Message(unquote(rest))),
        "title" => Ok(FlowCommand::Title(unquote(rest))),
        "review" => Ok(FlowCommand::Review(unquote(rest))),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn non_empty(rest: &str) -> Option<String> {
    (!rest.is_empty()).then(|| rest.to_string())
}

fn required(
    rest: &str,
    command: &'static str,
    argument: &'static str,
) -> Result<String, CommandError> {
    non_empty(rest).ok_or(CommandError::MissingArgument { command, argument })
}

fn message_argument(rest: &str) -> String {
    let rest = rest.strip_prefix("-m").map(str::trim_start).unwrap_or(rest);
    unquote(rest)
}

fn unquote(text: &str) -> String {
    let text = text.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|t| t.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    text.to_string()
}

/// 各组件的命令帮助
pub fn help(widget: Widget) -> &'static str {
    match widget {
        Widget::Sandbox => {
            "touch [file] | add [files..] | commit [-m msg] | branch <name> | checkout <name> | merge <name> | status | reset | quit"
        }
        Widget::Sync => "commit [-m msg] | teammate [msg] | push | pull | status | reset | quit",
        Widget::Pr => "next | message <text> | title <text> | review <text> | status | reset | quit",
    }
}
