use crate::config::SimConfig;
use crate::git::event_log::{single_line, EventLog};
use crate::git::templates::{FlowContext, FlowTemplates};
use crate::infrastructure::error::SimError;
use serde::{Deserialize, Serialize};

const FLOW_BRANCH: &str = "fix-awesome-feature";
const PR_NUMBER: u32 = 42;
const DEFAULT_COMMIT_MESSAGE: &str = "Fix awesome feature";
const DEFAULT_PR_TITLE: &str = "Fix awesome feature";
const DEFAULT_REVIEW_COMMENT: &str = "LGTM! Great work 🎉";
const SEED_LOG: [&str; 2] = [
    "Welcome to the Pull Request simulator!",
    "Click 'Fork' to begin your open-source contribution.",
];

/// Pull Request 工作流的各个阶段，严格按顺序推进
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrStep {
    Idle,
    Forked,
    Cloned,
    Branched,
    Committed,
    Pushed,
    PrOpened,
    Reviewed,
    Merged,
}

impl PrStep {
    pub const ORDER: [PrStep; 9] = [
        PrStep::Idle,
        PrStep::Forked,
        PrStep::Cloned,
        PrStep::Branched,
        PrStep::Committed,
        PrStep::Pushed,
        PrStep::PrOpened,
        PrStep::Reviewed,
        PrStep::Merged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrStep::Idle => "idle",
            PrStep::Forked => "forked",
            PrStep::Cloned => "cloned",
            PrStep::Branched => "branched",
            PrStep::Committed => "committed",
            PrStep::Pushed => "pushed",
            PrStep::PrOpened => "pr-opened",
            PrStep::Reviewed => "reviewed",
            PrStep::Merged => "merged",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// 下一个阶段，终态返回 `None`
    pub fn next(&self) -> Option<PrStep> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    pub fn title(&self) -> &'static str {
        match self {
            PrStep::Idle => "Start",
            PrStep::Forked => "Forked!",
            PrStep::Cloned => "Cloned!",
            PrStep::Branched => "Branched!",
            PrStep::Committed => "Committed!",
            PrStep::Pushed => "Pushed!",
            PrStep::PrOpened => "PR Opened!",
            PrStep::Reviewed => "Approved!",
            PrStep::Merged => "Merged! 🎉",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PrStep::Idle => "Find a repository you want to contribute to",
            PrStep::Forked => "Repository copied to your GitHub account",
            PrStep::Cloned => "Repository downloaded to your local machine",
            PrStep::Branched => "Created a new branch for your changes",
            PrStep::Committed => "Your changes are saved locally",
            PrStep::Pushed => "Your branch is now on GitHub",
            PrStep::PrOpened => "Pull request created — awaiting review",
            PrStep::Reviewed => "Maintainer approved your changes",
            PrStep::Merged => "Your code is now part of the project!",
        }
    }

    /// 进入该阶段所需的操作名称
    pub fn action_label(&self) -> &'static str {
        match self {
            PrStep::Idle => "Start",
            PrStep::Forked => "Fork Repository",
            PrStep::Cloned => "Clone to Local",
            PrStep::Branched => "Create Branch",
            PrStep::Committed => "Commit Changes",
            PrStep::Pushed => "Push to GitHub",
            PrStep::PrOpened => "Open Pull Request",
            PrStep::Reviewed => "Approve Review",
            PrStep::Merged => "Merge PR!",
        }
    }
}

/// PR 流程的只读快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSnapshot {
    pub step: PrStep,
    pub index: usize,
    pub title: String,
    pub description: String,
    pub next_action: Option<String>,
    pub progress: f32,
    pub commit_message: String,
    pub pr_title: String,
    pub review_comment: String,
    pub log: Vec<String>,
}

/// fork → clone → branch → commit → push → PR → review → merge 状态机
///
/// 与 [`crate::git::Repository`] 不共享任何状态。
#[derive(Debug)]
pub struct PrFlow {
    step: PrStep,
    commit_message: String,
    pr_title: String,
    review_comment: String,
    templates: FlowTemplates,
    log: EventLog,
}

impl PrFlow {
    pub fn new(log_capacity: usize) -> Result<Self, SimError> {
        Ok(Self {
            step: PrStep::Idle,
            commit_message: String::new(),
            pr_title: String::new(),
            review_comment: String::new(),
            templates: FlowTemplates::new()?,
            log: EventLog::seeded(log_capacity, SEED_LOG),
        })
    }

    pub fn from_config(config: &SimConfig) -> Result<Self, SimError> {
        Self::new(config.pr_log_capacity)
    }

    pub fn step(&self) -> PrStep {
        self.step
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn templates_mut(&mut self) -> &mut FlowTemplates {
        &mut self.templates
    }

    pub fn commit_message(&self) -> &str {
        &self.commit_message
    }

    pub fn pr_title(&self) -> &str {
        &self.pr_title
    }

    pub fn review_comment(&self) -> &str {
        &self.review_comment
    }

    pub fn set_commit_message(&mut self, message: impl Into<String>) {
        self.commit_message = message.into();
    }

    pub fn set_pr_title(&mut self, title: impl Into<String>) {
        self.pr_title = title.into();
    }

    pub fn set_review_comment(&mut self, comment: impl Into<String>) {
        self.review_comment = comment.into();
    }

    /// 下一步操作的名称，终态时为 `None`
    pub fn next_action(&self) -> Option<&'static str> {
        self.step.next().map(|next| next.action_label())
    }

    /// 完成度，取值 `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.step.index() as f32 / (PrStep::ORDER.len() - 1) as f32
    }

    /// 推进到下一阶段
    ///
    /// 终态时返回 `Ok(None)` 且不写日志。提交、开 PR、评审三步会消费对应的
    /// 输入文本，留空时使用默认文本。
    pub fn advance(&mut self) -> Result<Option<PrStep>, SimError> {
        let Some(next) = self.step.next() else {
            return Ok(None);
        };

        let context = FlowContext {
            branch: FLOW_BRANCH.to_string(),
            commit_message: or_default(&self.commit_message, DEFAULT_COMMIT_MESSAGE),
            pr_title: or_default(&self.pr_title, DEFAULT_PR_TITLE),
            review_comment: or_default(&self.review_comment, DEFAULT_REVIEW_COMMENT),
            pr_number: PR_NUMBER,
        };
        let lines = self.templates.render(next, &context)?;
        self.log.extend(lines);

        match next {
            PrStep::Committed => self.commit_message.clear(),
            PrStep::PrOpened => self.pr_title.clear(),
            PrStep::Reviewed => self.review_comment.clear(),
            _ => {}
        }

        tracing::info!(from = self.step.as_str(), to = next.as_str(), "pr flow advanced");
        self.step = next;
        Ok(Some(next))
    }

    /// 回到 `idle`，清空输入并恢复初始日志
    pub fn reset(&mut self) {
        self.step = PrStep::Idle;
        self.commit_message.clear();
        self.pr_title.clear();
        self.review_comment.clear();
        self.log.reset();
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            step: self.step,
            index: self.step.index(),
            title: self.step.title().to_string(),
            description: self.step.description().to_string(),
            next_action: self.next_action().map(str::to_string),
            progress: self.progress(),
            commit_message: self.commit_message.clone(),
            pr_title: self.pr_title.clone(),
            review_comment: self.review_comment.clone(),
            log: self.log.to_vec(),
        }
    }
}

fn or_default(input: &str, fallback: &str) -> String {
    match single_line(input) {
        text if text.is_empty() => fallback.to_string(),
        text => text,
    }
}
