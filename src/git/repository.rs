use crate::config::SimConfig;
use crate::git::event_log::{single_line, EventLog};
use crate::git::hash::{short, CommitId, IdentifierGenerator};
use crate::infrastructure::error::SimError;
use serde::{Deserialize, Serialize};

/// 默认分支
pub const DEFAULT_BRANCH: &str = "main";

/// 分支展示颜色，按创建顺序循环使用
pub const BRANCH_COLORS: [&str; 5] = ["git-green", "git-blue", "git-purple", "git-orange", "git-cyan"];

/// `create_file` 未指定文件名时可选的文件
pub const SAMPLE_FILES: [&str; 8] = [
    "index.html",
    "style.css",
    "app.js",
    "utils.ts",
    "config.json",
    "package.json",
    "server.ts",
    "api.ts",
];

const INITIAL_MESSAGE: &str = "Initial commit";
const INITIAL_FILE: &str = "README.md";
const SEED_LOG: [&str; 2] = ["$ git init", "Initialized empty Git repository"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub hash: String,
    pub branch: String,
    pub parent_ids: Vec<CommitId>,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() == 2
    }

    pub fn short_hash(&self) -> &str {
        short(&self.hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub color: String,
    /// 创建分支时父分支的头提交
    pub fork_point: Option<CommitId>,
}

/// 合并记录，只用于重绘合并连线
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRecord {
    pub from_branch: String,
    pub to_branch: String,
    pub at_commit: CommitId,
}

/// 仓库的只读快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub commits: Vec<Commit>,
    pub branches: Vec<Branch>,
    pub current_branch: String,
    pub head: Option<CommitId>,
    pub working_files: Vec<String>,
    pub staged_files: Vec<String>,
    pub merges: Vec<MergeRecord>,
    pub log: Vec<String>,
}

/// 内存中的提交图
///
/// 提交只追加不修改；分支的头提交不单独存储，每次通过 [`Repository::head_of`]
/// 从提交序列推导。
#[derive(Debug)]
pub struct Repository {
    commits: Vec<Commit>,
    branches: Vec<Branch>,
    current_branch: String,
    working_files: Vec<String>,
    staged_files: Vec<String>,
    merges: Vec<MergeRecord>,
    ids: IdentifierGenerator,
    log: EventLog,
}

impl Repository {
    pub fn new(log_capacity: usize, hash_seed: Option<u64>) -> Self {
        Self::with_generator(log_capacity, IdentifierGenerator::from_seed(hash_seed))
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.sandbox_log_capacity, config.hash_seed)
    }

    pub fn with_generator(log_capacity: usize, ids: IdentifierGenerator) -> Self {
        let mut repo = Self {
            commits: Vec::new(),
            branches: Vec::new(),
            current_branch: DEFAULT_BRANCH.to_string(),
            working_files: Vec::new(),
            staged_files: Vec::new(),
            merges: Vec::new(),
            ids,
            log: EventLog::seeded(log_capacity, SEED_LOG),
        };
        repo.seed();
        repo
    }

    fn seed(&mut self) {
        self.branches = vec![Branch {
            name: DEFAULT_BRANCH.to_string(),
            color: BRANCH_COLORS[0].to_string(),
            fork_point: None,
        }];
        self.current_branch = DEFAULT_BRANCH.to_string();
        self.working_files = vec![INITIAL_FILE.to_string()];
        self.staged_files.clear();
        self.merges.clear();
        self.commits.clear();
        self.append_commit(INITIAL_MESSAGE.to_string(), Vec::new());
    }

    /// 回到初始状态
    pub fn reset(&mut self) {
        self.ids.restart();
        self.seed();
        self.log.reset();
        tracing::info!("sandbox repository reset");
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn current_branch(&self) -> &str {
        &self.current_branch
    }

    pub fn working_files(&self) -> &[String] {
        &self.working_files
    }

    pub fn staged_files(&self) -> &[String] {
        &self.staged_files
    }

    pub fn merges(&self) -> &[MergeRecord] {
        &self.merges
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn find_commit(&self, id: CommitId) -> Option<&Commit> {
        self.commits.iter().find(|c| c.id == id)
    }

    /// 按名称查找分支，名称按 `normalize_branch_name` 规则比较
    pub fn branch(&self, name: &str) -> Option<&Branch> {
        let wanted = normalize_branch_name(name);
        self.branches.iter().find(|b| b.name == wanted)
    }

    pub fn branch_color(&self, name: &str) -> &str {
        self.branch(name)
            .map(|b| b.color.as_str())
            .unwrap_or(BRANCH_COLORS[0])
    }

    /// 分支的头提交
    ///
    /// 先倒序查找属于该分支的最新提交；分支尚无自己的提交时返回创建时的分叉点。
    pub fn head_of(&self, branch_name: &str) -> Option<&Commit> {
        let branch = self.branch(branch_name)?;
        self.commits
            .iter()
            .rev()
            .find(|c| c.branch == branch.name)
            .or_else(|| branch.fork_point.and_then(|id| self.find_commit(id)))
    }

    /// 当前分支的头提交
    pub fn head(&self) -> Option<&Commit> {
        self.head_of(&self.current_branch)
    }

    /// 在工作区创建文件，未指定名称时从示例文件中挑选一个
    pub fn create_file(&mut self, name: Option<&str>) -> Option<String> {
        let file = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => {
                if self.is_tracked_change(name) {
                    return None;
                }
                name.to_string()
            }
            None => {
                let available: Vec<&str> = SAMPLE_FILES
                    .iter()
                    .copied()
                    .filter(|f| !self.is_tracked_change(f))
                    .collect();
                if available.is_empty() {
                    return None;
                }
                let pick = self.ids.pick(available.len());
                available[pick].to_string()
            }
        };

        self.working_files.push(file.clone());
        self.log.push(format!("$ echo \"content\" > {}", file));
        self.log.push(format!("Created {}", file));
        Some(file)
    }

    fn is_tracked_change(&self, name: &str) -> bool {
        self.working_files.iter().any(|f| f == name) || self.staged_files.iter().any(|f| f == name)
    }

    /// `git add .`
    pub fn stage_all(&mut self) -> Result<usize, SimError> {
        self.log.push("$ git add .");
        if self.working_files.is_empty() {
            self.log.push("nothing to add");
            return Err(SimError::NothingToAdd);
        }

        let files = std::mem::take(&mut self.working_files);
        self.log.push(format!("Staged: {}", files.join(", ")));
        let count = files.len();
        self.staged_files.extend(files);
        Ok(count)
    }

    /// 把指定文件从工作区移到暂存区，任一文件不存在则整体拒绝
    pub fn stage(&mut self, files: &[&str]) -> Result<usize, SimError> {
        if files.is_empty() {
            return self.stage_all();
        }

        self.log.push(format!("$ git add {}", files.join(" ")));
        if self.working_files.is_empty() {
            self.log.push("nothing to add");
            return Err(SimError::NothingToAdd);
        }
        if let Some(missing) = files.iter().find(|f| !self.working_files.iter().any(|w| w == *f)) {
            self.log.push(format!(
                "! fatal: pathspec '{}' did not match any files",
                missing
            ));
            return Err(SimError::PathspecNotFound {
                path: missing.to_string(),
            });
        }

        let mut staged = Vec::new();
        self.working_files.retain(|w| {
            if files.contains(&w.as_str()) {
                staged.push(w.clone());
                false
            } else {
                true
            }
        });
        self.log.push(format!("Staged: {}", staged.join(", ")));
        let count = staged.len();
        self.staged_files.extend(staged);
        Ok(count)
    }

    /// 在当前分支上提交
    ///
    /// 暂存区为空且没有提交信息时为空操作；否则以当前分支头为父提交。
    pub fn commit(&mut self, message: &str) -> Result<CommitId, SimError> {
        let message = single_line(message);
        if self.staged_files.is_empty() && message.is_empty() {
            self.log.push("$ git commit");
            self.log.push("nothing to commit, working tree clean");
            return Err(SimError::NothingToCommit);
        }

        let message = if message.is_empty() {
            format!(
                "Update {}",
                self.staged_files.first().map(String::as_str).unwrap_or("files")
            )
        } else {
            message
        };
        let changed = self.staged_files.len().max(1);
        let parents: Vec<CommitId> = self.head().map(|c| c.id).into_iter().collect();

        let id = self.append_commit(message.clone(), parents);
        let hash = self.commit_hash(id);
        self.staged_files.clear();

        self.log.push(format!("$ git commit -m \"{}\"", message));
        self.log
            .push(format!("[{} {}] {}", self.current_branch, short(&hash), message));
        self.log.push(format!("{} file(s) changed", changed));
        tracing::info!(commit = %id, branch = %self.current_branch, "created commit");
        Ok(id)
    }

    /// 创建分支并切换过去
    ///
    /// 名称会去除首尾空白、把连续空白折叠为 `-` 并转为小写。
    pub fn create_branch(&mut self, name: &str) -> Result<String, SimError> {
        let normalized = normalize_branch_name(name);
        let shown = if normalized.is_empty() { "???" } else { normalized.as_str() };
        self.log.push(format!("$ git checkout -b {}", shown));

        if normalized.is_empty() {
            self.log.push(format!("! fatal: '{}' is not a valid branch name", name.trim()));
            return Err(SimError::InvalidBranchName {
                name: name.to_string(),
            });
        }
        if self.branch(&normalized).is_some() {
            self.log
                .push(format!("! fatal: a branch named '{}' already exists", normalized));
            tracing::warn!(branch = %normalized, "branch already exists");
            return Err(SimError::BranchExists { name: normalized });
        }

        let fork_point = self.head().map(|c| c.id);
        let color = BRANCH_COLORS[self.branches.len() % BRANCH_COLORS.len()].to_string();
        self.branches.push(Branch {
            name: normalized.clone(),
            color,
            fork_point,
        });
        self.current_branch = normalized.clone();
        self.log
            .push(format!("Switched to a new branch '{}'", normalized));
        tracing::info!(branch = %normalized, fork_point = ?fork_point, "created branch");
        Ok(normalized)
    }

    /// 切换分支，已在该分支上时返回 `Ok(false)`
    pub fn checkout(&mut self, name: &str) -> Result<bool, SimError> {
        let target = match self.branch(name) {
            Some(branch) => branch.name.clone(),
            None => {
                self.log.push(format!("$ git checkout {}", name.trim()));
                self.log.push(format!(
                    "! error: pathspec '{}' did not match any branch known to git",
                    name.trim()
                ));
                return Err(SimError::UnknownBranch {
                    name: name.trim().to_string(),
                });
            }
        };

        self.log.push(format!("$ git checkout {}", target));
        if target == self.current_branch {
            self.log.push(format!("Already on '{}'", target));
            return Ok(false);
        }

        self.current_branch = target;
        self.log
            .push(format!("Switched to branch '{}'", self.current_branch));
        Ok(true)
    }

    pub fn snapshot(&self) -> RepositorySnapshot {
        RepositorySnapshot {
            commits: self.commits.clone(),
            branches: self.branches.clone(),
            current_branch: self.current_branch.clone(),
            head: self.head().map(|c| c.id),
            working_files: self.working_files.clone(),
            staged_files: self.staged_files.clone(),
            merges: self.merges.clone(),
            log: self.log.to_vec(),
        }
    }

    /// 在当前分支追加一个提交
    pub(crate) fn append_commit(&mut self, message: String, parent_ids: Vec<CommitId>) -> CommitId {
        let id = self.ids.next_id();
        let hash = self.ids.next_hash();
        self.commits.push(Commit {
            id,
            message,
            hash,
            branch: self.current_branch.clone(),
            parent_ids,
        });
        id
    }

    pub(crate) fn record_merge(&mut self, record: MergeRecord) {
        self.merges.push(record);
    }

    pub(crate) fn log_mut(&mut self) -> &mut EventLog {
        &mut self.log
    }

    pub(crate) fn commit_hash(&self, id: CommitId) -> String {
        self.find_commit(id).map(|c| c.hash.clone()).unwrap_or_default()
    }
}

/// 规范化分支名
pub fn normalize_branch_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> Repository {
        Repository::new(64, Some(1))
    }

    #[test]
    fn test_seed_state() {
        let repo = repo();
        assert_eq!(repo.commits().len(), 1);
        assert!(repo.commits()[0].parent_ids.is_empty());
        assert_eq!(repo.current_branch(), "main");
        assert_eq!(repo.working_files(), ["README.md".to_string()]);
        assert_eq!(
            repo.log().to_vec(),
            vec!["$ git init", "Initialized empty Git repository"]
        );
    }

    #[test]
    fn test_stage_all_moves_files() {
        let mut repo = repo();
        repo.create_file(Some("app.js"));
        assert_eq!(repo.stage_all(), Ok(2));
        assert!(repo.working_files().is_empty());
        assert_eq!(repo.staged_files(), ["README.md".to_string(), "app.js".to_string()]);
        assert_eq!(repo.log().last(), Some("Staged: README.md, app.js"));
    }

    #[test]
    fn test_stage_with_empty_working_set() {
        let mut repo = repo();
        repo.stage_all().unwrap();
        assert_eq!(repo.stage_all(), Err(SimError::NothingToAdd));
        assert_eq!(repo.log().last(), Some("nothing to add"));
    }

    #[test]
    fn test_stage_named_files() {
        let mut repo = repo();
        repo.create_file(Some("a.rs"));
        repo.create_file(Some("b.rs"));
        assert_eq!(repo.stage(&["b.rs"]), Ok(1));
        assert_eq!(repo.staged_files(), ["b.rs".to_string()]);
        assert_eq!(repo.working_files(), ["README.md".to_string(), "a.rs".to_string()]);

        let err = repo.stage(&["a.rs", "missing.rs"]).unwrap_err();
        assert_eq!(err, SimError::PathspecNotFound { path: "missing.rs".into() });
        assert_eq!(repo.staged_files(), ["b.rs".to_string()]);
    }

    #[test]
    fn test_create_file_picks_unused_sample() {
        let mut repo = repo();
        let mut created = Vec::new();
        while let Some(file) = repo.create_file(None) {
            created.push(file);
        }
        assert_eq!(created.len(), SAMPLE_FILES.len());
        created.sort();
        created.dedup();
        assert_eq!(created.len(), SAMPLE_FILES.len());
    }

    #[test]
    fn test_commit_without_changes_is_noop() {
        let mut repo = repo();
        repo.working_files.clear();
        let before = repo.commits().len();
        assert_eq!(repo.commit(""), Err(SimError::NothingToCommit));
        assert_eq!(repo.commits().len(), before);
        assert_eq!(repo.log().last(), Some("nothing to commit, working tree clean"));
    }

    #[test]
    fn test_commit_default_message_and_parent() {
        let mut repo = repo();
        repo.stage_all().unwrap();
        let root = repo.commits()[0].id;
        let id = repo.commit("").unwrap();
        let commit = repo.find_commit(id).unwrap();
        assert_eq!(commit.message, "Update README.md");
        assert_eq!(commit.parent_ids, vec![root]);
        assert!(repo.staged_files().is_empty());
        assert_eq!(repo.log().last(), Some("1 file(s) changed"));
    }

    #[test]
    fn test_commit_with_message_only() {
        let mut repo = repo();
        let id = repo.commit("docs").unwrap();
        assert_eq!(repo.find_commit(id).unwrap().message, "docs");
    }

    #[test]
    fn test_branch_normalization_and_duplicates() {
        let mut repo = repo();
        assert_eq!(repo.create_branch("  My   Feature "), Ok("my-feature".to_string()));
        assert_eq!(repo.current_branch(), "my-feature");
        assert_eq!(repo.branches()[1].color, "git-blue");

        let count = repo.branches().len();
        let err = repo.create_branch("MY FEATURE").unwrap_err();
        assert_eq!(err, SimError::BranchExists { name: "my-feature".into() });
        assert_eq!(repo.branches().len(), count);
        assert_eq!(repo.current_branch(), "my-feature");

        assert!(matches!(
            repo.create_branch("   "),
            Err(SimError::InvalidBranchName { .. })
        ));
        assert!(repo.create_branch("Main").is_err());
    }

    #[test]
    fn test_fork_point_head() {
        let mut repo = repo();
        let c2 = repo.commit("c2").unwrap();
        repo.create_branch("feature").unwrap();
        assert_eq!(repo.head_of("feature").map(|c| c.id), Some(c2));
        assert_eq!(repo.branch("feature").unwrap().fork_point, Some(c2));

        // 从尚无提交的分支再分叉
        repo.create_branch("nested").unwrap();
        assert_eq!(repo.head_of("nested").map(|c| c.id), Some(c2));
    }

    #[test]
    fn test_checkout() {
        let mut repo = repo();
        repo.create_branch("feature").unwrap();
        assert_eq!(repo.checkout("main"), Ok(true));
        assert_eq!(repo.current_branch(), "main");
        assert_eq!(repo.checkout("main"), Ok(false));
        assert_eq!(repo.log().last(), Some("Already on 'main'"));
        assert_eq!(
            repo.checkout("nope"),
            Err(SimError::UnknownBranch { name: "nope".into() })
        );
        assert_eq!(repo.current_branch(), "main");
    }

    #[test]
    fn test_reset() {
        let mut repo = repo();
        repo.create_branch("feature").unwrap();
        repo.commit("f1").unwrap();
        repo.reset();
        assert_eq!(repo.commits().len(), 1);
        assert_eq!(repo.branches().len(), 1);
        assert_eq!(repo.current_branch(), "main");
        assert_eq!(repo.commits()[0].id, CommitId(1));
        assert_eq!(repo.log().len(), 2);
    }

    #[test]
    fn test_unknown_branch_has_no_head() {
        let repo = repo();
        assert!(repo.head_of("ghost").is_none());
    }
}
