use crate::cli::args::Widget;
use crate::cli::commands::{self, Command, FlowCommand, SandboxCommand, SyncCommand};
use crate::config::SimConfig;
use crate::git::{EventLog, MergeEngine, PrFlow, Repository, SyncSimulator};
use crate::infrastructure::error::{ErrorCategory, SimError};

/// 每个组件独立持有自己的引擎实例
#[derive(Debug)]
pub enum Session {
    Sandbox(Repository),
    Sync(SyncSimulator),
    Flow(PrFlow),
}

/// 执行一行命令后的输出
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LineOutput {
    /// 本次新增的叙述日志行
    pub lines: Vec<String>,
    /// 非日志的提示信息（帮助、解析错误、快照）
    pub notes: Vec<String>,
    /// 引擎拒绝或空操作时的错误
    pub error: Option<SimError>,
    pub quit: bool,
}

/// 命令行驱动：解析命令、调用引擎、输出日志增量
#[derive(Debug)]
pub struct Shell {
    widget: Widget,
    session: Session,
    json: bool,
}

impl Shell {
    pub fn new(widget: Widget, config: &SimConfig, json: bool) -> Result<Self, SimError> {
        let session = match widget {
            Widget::Sandbox => Session::Sandbox(Repository::from_config(config)),
            Widget::Sync => Session::Sync(SyncSimulator::from_config(config)),
            Widget::Pr => Session::Flow(PrFlow::from_config(config)?),
        };
        Ok(Self {
            widget,
            session,
            json,
        })
    }

    pub fn widget(&self) -> Widget {
        self.widget
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn log(&self) -> &EventLog {
        match &self.session {
            Session::Sandbox(repo) => repo.log(),
            Session::Sync(sim) => sim.log(),
            Session::Flow(flow) => flow.log(),
        }
    }

    /// 当前状态的 JSON 快照
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        match &self.session {
            Session::Sandbox(repo) => serde_json::to_string_pretty(&repo.snapshot()),
            Session::Sync(sim) => serde_json::to_string_pretty(&sim.snapshot()),
            Session::Flow(flow) => serde_json::to_string_pretty(&flow.snapshot()),
        }
    }

    /// 人类可读的状态摘要
    pub fn status(&self) -> Vec<String> {
        match &self.session {
            Session::Sandbox(repo) => {
                let mut out = vec![format!("On branch {}", repo.current_branch())];
                for commit in repo.commits() {
                    out.push(format!(
                        "  {} {:<12} {}{}",
                        commit.short_hash(),
                        commit.branch,
                        commit.message,
                        if commit.is_merge() { " (merge)" } else { "" }
                    ));
                }
                out.push(format!("  working: {}", repo.working_files().join(", ")));
                out.push(format!("  staged:  {}", repo.staged_files().join(", ")));
                out
            }
            Session::Sync(sim) => {
                let render = |commits: &[crate::git::Commit]| {
                    commits
                        .iter()
                        .map(|c| c.short_hash().to_string())
                        .collect::<Vec<_>>()
                        .join(" ")
                };
                vec![
                    format!("local:  {}", render(sim.local().as_slice())),
                    format!("remote: {}", render(sim.remote().commits().as_slice())),
                    format!(
                        "ahead {}, behind {}",
                        sim.unpushed().len(),
                        sim.unpulled().len()
                    ),
                ]
            }
            Session::Flow(flow) => {
                let step = flow.step();
                let mut out = vec![format!(
                    "[{}/{}] {} - {}",
                    step.index(),
                    crate::git::PrStep::ORDER.len() - 1,
                    step.title(),
                    step.description()
                )];
                if let Some(action) = flow.next_action() {
                    out.push(format!("next: {}", action));
                }
                out
            }
        }
    }

    /// 执行一行输入
    ///
    /// 引擎返回的错误已经写入叙述日志，这里不再中断。
    pub async fn run_line(&mut self, line: &str) -> LineOutput {
        let mark = self.log().total();
        let mut output = LineOutput::default();

        match commands::parse(self.widget, line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => output.quit = true,
            Ok(Some(Command::Help)) => output.notes.push(commands::help(self.widget).to_string()),
            Ok(Some(Command::Status)) => output.notes.extend(self.status()),
            Ok(Some(command)) => {
                if let Err(err) = self.execute(command).await {
                    match err.category() {
                        ErrorCategory::NoOp => {
                            tracing::debug!(error = %err, "command finished without changes")
                        }
                        ErrorCategory::Rejected => tracing::warn!(error = %err, "command rejected"),
                        ErrorCategory::Internal => {
                            // 内部错误不会写入叙述日志
                            tracing::error!(error = %err, "command failed");
                            output.notes.push(format!("error: {}", err));
                        }
                    }
                    output.error = Some(err);
                }
            }
            Err(err) => output.notes.push(err.to_string()),
        }

        output.lines = self.log().since(mark);
        if self.json && !output.quit {
            match self.snapshot_json() {
                Ok(json) => output.notes.push(json),
                Err(err) => tracing::warn!(error = %err, "failed to serialize snapshot"),
            }
        }
        output
    }

    async fn execute(&mut self, command: Command) -> Result<(), SimError> {
        match (&mut self.session, command) {
            (Session::Sandbox(repo), Command::Reset) => repo.reset(),
            (Session::Sync(sim), Command::Reset) => sim.reset(),
            (Session::Flow(flow), Command::Reset) => flow.reset(),
            (Session::Sandbox(repo), Command::Sandbox(cmd)) => match cmd {
                SandboxCommand::Touch(name) => {
                    repo.create_file(name.as_deref());
                }
                SandboxCommand::Add(files) => {
                    let files: Vec<&str> = files.iter().map(String::as_str).collect();
                    repo.stage(&files)?;
                }
                SandboxCommand::Commit(message) => {
                    repo.commit(&message)?;
                }
                SandboxCommand::Branch(name) => {
                    repo.create_branch(&name)?;
                }
                SandboxCommand::Checkout(name) => {
                    repo.checkout(&name)?;
                }
                SandboxCommand::Merge(name) => {
                    MergeEngine::merge(repo, &name)?;
                }
            },
            (Session::Sync(sim), Command::Sync(cmd)) => match cmd {
                SyncCommand::Commit(message) => {
                    sim.local_commit(&message);
                }
                SyncCommand::Teammate(message) => {
                    sim.teammate_commit(&message)?;
                }
                SyncCommand::Push => {
                    sim.push_and_wait().await?;
                }
                SyncCommand::Pull => {
                    sim.pull_and_wait().await?;
                }
            },
            (Session::Flow(flow), Command::Flow(cmd)) => match cmd {
                FlowCommand::Next => {
                    flow.advance()?;
                }
                FlowCommand::Message(text) => flow.set_commit_message(text),
                FlowCommand::Title(text) => flow.set_pr_title(text),
                FlowCommand::Review(text) => flow.set_review_comment(text),
            },
            (_, command) => {
                tracing::warn!(?command, "command does not belong to this widget");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimConfig {
        SimConfig {
            transfer_delay_ms: 0,
            hash_seed: Some(3),
            ..SimConfig::default()
        }
    }

    #[tokio::test]
    async fn test_sandbox_round() {
        let mut shell = Shell::new(Widget::Sandbox, &config(), false).unwrap();
        let out = shell.run_line("add .").await;
        assert_eq!(out.lines, vec!["$ git add .", "Staged: README.md"]);

        let out = shell.run_line("commit -m \"Add readme\"").await;
        assert_eq!(out.lines[0], "$ git commit -m \"Add readme\"");
        assert_eq!(out.lines.len(), 3);
    }

    #[tokio::test]
    async fn test_parse_error_is_a_note() {
        let mut shell = Shell::new(Widget::Pr, &config(), false).unwrap();
        let out = shell.run_line("fork").await;
        assert!(out.lines.is_empty());
        assert_eq!(out.notes.len(), 1);
        assert!(!out.quit);
        assert!(shell.run_line("quit").await.quit);
    }

    #[tokio::test]
    async fn test_json_snapshot_follows_command() {
        let mut shell = Shell::new(Widget::Sync, &config(), true).unwrap();
        let out = shell.run_line("push").await;
        let value: serde_json::Value = serde_json::from_str(out.notes.last().unwrap()).unwrap();
        assert_eq!(value["remote"].as_array().unwrap().len(), 2);
        assert!(value["transfer"].is_null());
    }

    #[tokio::test]
    async fn test_reset_prints_seed_log() {
        let mut shell = Shell::new(Widget::Sandbox, &config(), false).unwrap();
        shell.run_line("commit -m a").await;
        shell.run_line("commit -m b").await;
        let out = shell.run_line("reset").await;
        assert_eq!(
            out.lines,
            vec!["$ git init", "Initialized empty Git repository"]
        );
        assert!(out.error.is_none());
    }

    #[tokio::test]
    async fn test_error_category_reported() {
        let mut shell = Shell::new(Widget::Sandbox, &config(), false).unwrap();
        shell.run_line("add .").await;
        shell.run_line("commit").await;

        let out = shell.run_line("commit").await;
        let err = out.error.unwrap();
        assert!(err.is_noop());
        assert!(out.notes.is_empty());

        let out = shell.run_line("checkout nowhere").await;
        assert_eq!(out.error.unwrap().category(), ErrorCategory::Rejected);
        assert!(out.lines.last().unwrap().starts_with('!'));
    }

    #[tokio::test]
    async fn test_checkout_by_raw_branch_name() {
        let mut shell = Shell::new(Widget::Sandbox, &config(), false).unwrap();
        shell.run_line("branch My Feature").await;
        shell.run_line("checkout main").await;
        let out = shell.run_line("checkout My Feature").await;
        assert!(out.error.is_none());
        assert_eq!(out.lines.last().unwrap(), "Switched to branch 'my-feature'");
    }
}
