use crate::config::SimConfig;
use crate::git::event_log::{single_line, EventLog};
use crate::git::hash::{short, CommitId, IdentifierGenerator};
use crate::git::repository::{Commit, DEFAULT_BRANCH};
use crate::infrastructure::error::SimError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_REMOTE_URL: &str = "https://github.com/you/repo.git";

const REMOTE_NAME: &str = "origin";
const DEFAULT_LOCAL_MESSAGE: &str = "Update files";
const DEFAULT_TEAMMATE_MESSAGE: &str = "Teammate's update";
const SEED_COMMITS: [&str; 2] = ["Initial commit", "Add homepage"];

/// 只追加的提交序列，按提交标识比较成员关系
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitSequence {
    commits: Vec<Commit>,
}

impl CommitSequence {
    pub fn as_slice(&self) -> &[Commit] {
        &self.commits
    }

    pub fn ids(&self) -> Vec<CommitId> {
        self.commits.iter().map(|c| c.id).collect()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn last(&self) -> Option<&Commit> {
        self.commits.last()
    }

    pub fn contains(&self, id: CommitId) -> bool {
        self.commits.iter().any(|c| c.id == id)
    }

    /// `self \ other`，保持 `self` 中的顺序
    pub fn missing_from(&self, other: &CommitSequence) -> Vec<Commit> {
        let known: HashSet<CommitId> = other.commits.iter().map(|c| c.id).collect();
        self.commits
            .iter()
            .filter(|c| !known.contains(&c.id))
            .cloned()
            .collect()
    }

    pub(crate) fn append(&mut self, commits: impl IntoIterator<Item = Commit>) {
        self.commits.extend(commits);
    }

    pub(crate) fn clear(&mut self) {
        self.commits.clear();
    }
}

/// 远程仓库，只有一条提交序列，没有分支与暂存区
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub name: String,
    pub url: String,
    commits: CommitSequence,
}

impl RemoteRepository {
    pub fn new(url: impl Into<String>, commits: CommitSequence) -> Self {
        Self {
            name: REMOTE_NAME.to_string(),
            url: url.into(),
            commits,
        }
    }

    pub fn commits(&self) -> &CommitSequence {
        &self.commits
    }

    /// 队友直接推送到远程，不经过本地仓库
    pub fn teammate_commit(
        &mut self,
        message: &str,
        ids: &mut IdentifierGenerator,
        log: &mut EventLog,
    ) -> CommitId {
        let message = match single_line(message) {
            msg if msg.is_empty() => DEFAULT_TEAMMATE_MESSAGE.to_string(),
            msg => msg,
        };
        let commit = Commit {
            id: ids.next_id(),
            message: message.clone(),
            hash: ids.next_hash(),
            branch: DEFAULT_BRANCH.to_string(),
            parent_ids: self.commits.last().map(|c| c.id).into_iter().collect(),
        };
        let id = commit.id;
        log.push(format!("[teammate] pushed: {} ({})", message, short(&commit.hash)));
        tracing::info!(commit = %id, "teammate pushed to remote");
        self.commits.append([commit]);
        id
    }

    fn receive(&mut self, commits: Vec<Commit>) {
        self.commits.append(commits);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Push,
    Pull,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferDirection::Push => write!(f, "push"),
            TransferDirection::Pull => write!(f, "pull"),
        }
    }
}

/// 正在传输中的提交
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub direction: TransferDirection,
    pub commits: Vec<Commit>,
}

/// `push` / `pull` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    /// 无需传输
    UpToDate,
    /// 已进入传输状态，携带提交数
    Transferring(usize),
}

/// 同步模拟器的只读快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSnapshot {
    pub local: Vec<Commit>,
    pub remote: Vec<Commit>,
    pub remote_url: String,
    pub transfer: Option<Transfer>,
    pub unpushed: usize,
    pub unpulled: usize,
    pub log: Vec<String>,
}

/// 本地与远程之间的推送/拉取模拟
///
/// 传输分两个阶段：`push`/`pull` 完成资格检查并进入传输状态，
/// `finish_transfer` 真正修改序列。传输期间不允许再次发起 `push`/`pull`。
#[derive(Debug)]
pub struct SyncSimulator {
    local: CommitSequence,
    remote: RemoteRepository,
    transfer: Option<Transfer>,
    ids: IdentifierGenerator,
    log: EventLog,
    delay: Duration,
}

impl SyncSimulator {
    pub fn new(log_capacity: usize, remote_url: &str, delay: Duration, hash_seed: Option<u64>) -> Self {
        let mut sim = Self {
            local: CommitSequence::default(),
            remote: RemoteRepository::new(remote_url, CommitSequence::default()),
            transfer: None,
            ids: IdentifierGenerator::from_seed(hash_seed),
            log: EventLog::seeded(
                log_capacity,
                [format!("$ git remote add {} {}", REMOTE_NAME, remote_url)],
            ),
            delay,
        };
        sim.seed();
        sim
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.sync_log_capacity,
            &config.remote_url,
            Duration::from_millis(config.transfer_delay_ms),
            config.hash_seed,
        )
    }

    /// 本地为 `[Initial commit, Add homepage]`，远程只有第一个
    fn seed(&mut self) {
        self.local.clear();
        self.remote.commits.clear();
        for message in SEED_COMMITS {
            let commit = Commit {
                id: self.ids.next_id(),
                message: message.to_string(),
                hash: self.ids.next_hash(),
                branch: DEFAULT_BRANCH.to_string(),
                parent_ids: self.local.last().map(|c| c.id).into_iter().collect(),
            };
            self.local.append([commit]);
        }
        self.remote.receive(self.local.as_slice()[..1].to_vec());
    }

    pub fn reset(&mut self) {
        self.ids.restart();
        self.transfer = None;
        self.seed();
        self.log.reset();
        tracing::info!("sync simulator reset");
    }

    pub fn local(&self) -> &CommitSequence {
        &self.local
    }

    pub fn remote(&self) -> &RemoteRepository {
        &self.remote
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn transfer(&self) -> Option<&Transfer> {
        self.transfer.as_ref()
    }

    pub fn is_pushing(&self) -> bool {
        matches!(&self.transfer, Some(t) if t.direction == TransferDirection::Push)
    }

    pub fn is_pulling(&self) -> bool {
        matches!(&self.transfer, Some(t) if t.direction == TransferDirection::Pull)
    }

    pub fn is_transferring(&self) -> bool {
        self.transfer.is_some()
    }

    /// 本地有而远程没有的提交
    pub fn unpushed(&self) -> Vec<Commit> {
        self.local.missing_from(&self.remote.commits)
    }

    /// 远程有而本地没有的提交
    pub fn unpulled(&self) -> Vec<Commit> {
        self.remote.commits.missing_from(&self.local)
    }

    /// 本地提交，传输期间同样允许
    pub fn local_commit(&mut self, message: &str) -> CommitId {
        let message = match single_line(message) {
            msg if msg.is_empty() => DEFAULT_LOCAL_MESSAGE.to_string(),
            msg => msg,
        };
        let commit = Commit {
            id: self.ids.next_id(),
            message: message.clone(),
            hash: self.ids.next_hash(),
            branch: DEFAULT_BRANCH.to_string(),
            parent_ids: self.local.last().map(|c| c.id).into_iter().collect(),
        };
        let id = commit.id;
        self.log.push(format!("$ git commit -m \"{}\"", message));
        self.log
            .push(format!("[{} {}] {}", DEFAULT_BRANCH, short(&commit.hash), message));
        self.local.append([commit]);
        id
    }

    /// 模拟队友向远程推送，制造分叉
    pub fn teammate_commit(&mut self, message: &str) -> Result<CommitId, SimError> {
        self.guard_idle()?;
        Ok(self.remote.teammate_commit(message, &mut self.ids, &mut self.log))
    }

    /// 发起推送
    ///
    /// 远程存在本地没有的提交时拒绝（非快进），不修改任何状态。
    pub fn push(&mut self) -> Result<SyncStatus, SimError> {
        self.guard_idle()?;
        self.log
            .push(format!("$ git push {} {}", REMOTE_NAME, DEFAULT_BRANCH));

        let unpushed = self.unpushed();
        if unpushed.is_empty() {
            self.log.push("Everything up-to-date");
            return Ok(SyncStatus::UpToDate);
        }

        let unpulled = self.unpulled();
        if !unpulled.is_empty() {
            self.log.push(format!(
                "! [rejected] {branch} -> {branch} (non-fast-forward)",
                branch = DEFAULT_BRANCH
            ));
            self.log.push("hint: pull first, then push again");
            tracing::warn!(behind = unpulled.len(), "push rejected");
            return Err(SimError::NonFastForward {
                behind: unpulled.len(),
            });
        }

        let count = unpushed.len();
        self.log
            .push(format!("Enumerating objects: {}, done.", count * 3));
        self.log.push("Compressing objects: 100%, done.");
        self.transfer = Some(Transfer {
            direction: TransferDirection::Push,
            commits: unpushed,
        });
        tracing::info!(commits = count, "push started");
        Ok(SyncStatus::Transferring(count))
    }

    /// 发起拉取，只做快进，不生成合并提交
    pub fn pull(&mut self) -> Result<SyncStatus, SimError> {
        self.guard_idle()?;
        self.log
            .push(format!("$ git pull {} {}", REMOTE_NAME, DEFAULT_BRANCH));

        let unpulled = self.unpulled();
        if unpulled.is_empty() {
            self.log.push("Already up to date.");
            return Ok(SyncStatus::UpToDate);
        }

        let count = unpulled.len();
        self.log
            .push(format!("remote: Counting objects: {}, done.", count * 3));
        self.transfer = Some(Transfer {
            direction: TransferDirection::Pull,
            commits: unpulled,
        });
        tracing::info!(commits = count, "pull started");
        Ok(SyncStatus::Transferring(count))
    }

    /// 完成正在进行的传输
    pub fn finish_transfer(&mut self) -> Result<Transfer, SimError> {
        let transfer = self.transfer.take().ok_or(SimError::NoTransferPending)?;
        let count = transfer.commits.len();
        let plural = if count > 1 { "s" } else { "" };

        match transfer.direction {
            TransferDirection::Push => {
                self.remote.receive(transfer.commits.clone());
                self.log.push(format!("To {}", self.remote.url));
                self.log.push(format!(
                    "  {branch} -> {branch} ({count} commit{plural})",
                    branch = DEFAULT_BRANCH
                ));
            }
            TransferDirection::Pull => {
                self.local.append(transfer.commits.clone());
                self.log.push("Fast-forward");
                self.log.push(format!("{count} file{plural} changed"));
            }
        }

        tracing::info!(direction = %transfer.direction, commits = count, "transfer finished");
        Ok(transfer)
    }

    /// 推送并等待模拟的网络延迟
    pub async fn push_and_wait(&mut self) -> Result<SyncStatus, SimError> {
        let status = self.push()?;
        self.settle(status).await
    }

    /// 拉取并等待模拟的网络延迟
    pub async fn pull_and_wait(&mut self) -> Result<SyncStatus, SimError> {
        let status = self.pull()?;
        self.settle(status).await
    }

    async fn settle(&mut self, status: SyncStatus) -> Result<SyncStatus, SimError> {
        if let SyncStatus::Transferring(_) = status {
            tokio::time::sleep(self.delay).await;
            self.finish_transfer()?;
        }
        Ok(status)
    }

    fn guard_idle(&mut self) -> Result<(), SimError> {
        match &self.transfer {
            Some(transfer) => {
                let direction = transfer.direction.to_string();
                self.log
                    .push(format!("! {} in progress, please wait", direction));
                Err(SimError::TransferInProgress { direction })
            }
            None => Ok(()),
        }
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            local: self.local.as_slice().to_vec(),
            remote: self.remote.commits.as_slice().to_vec(),
            remote_url: self.remote.url.clone(),
            transfer: self.transfer.clone(),
            unpushed: self.unpushed().len(),
            unpulled: self.unpulled().len(),
            log: self.log.to_vec(),
        }
    }
}
