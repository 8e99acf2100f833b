use crate::git::hash::{short, CommitId};
use crate::git::repository::{MergeRecord, Repository};
use crate::infrastructure::error::SimError;

/// 合并引擎
///
/// 合并总是成功，不做冲突检测。这个模拟器只展示历史的形状，
/// 不涉及文件内容，因此也就没有可以冲突的东西。
pub struct MergeEngine;

impl MergeEngine {
    /// 把 `from_branch` 合并进当前分支
    ///
    /// 生成的合并提交父提交顺序为 `[head_of(from), head_of(current)]`。
    /// 合并自身时返回 `Ok(None)`，不写日志。
    pub fn merge(repo: &mut Repository, from_branch: &str) -> Result<Option<CommitId>, SimError> {
        let current = repo.current_branch().to_string();
        let from = match repo.branch(from_branch) {
            Some(branch) => branch.name.clone(),
            None => {
                let log = repo.log_mut();
                log.push(format!("$ git merge {}", from_branch.trim()));
                log.push(format!(
                    "! merge: {} - not something we can merge",
                    from_branch.trim()
                ));
                return Err(SimError::UnknownBranch {
                    name: from_branch.trim().to_string(),
                });
            }
        };

        if from == current {
            return Ok(None);
        }

        let parents: Vec<CommitId> = [repo.head_of(&from), repo.head_of(&current)]
            .into_iter()
            .flatten()
            .map(|c| c.id)
            .collect();
        let message = format!("Merge '{}' into {}", from, current);
        let id = repo.append_commit(message.clone(), parents);
        let hash = repo.commit_hash(id);

        repo.record_merge(MergeRecord {
            from_branch: from.clone(),
            to_branch: current.clone(),
            at_commit: id,
        });

        let log = repo.log_mut();
        log.push(format!("$ git merge {}", from));
        log.push("Merge made by the 'ort' strategy.");
        log.push(format!("[{} {}] {}", current, short(&hash), message));
        tracing::info!(from = %from, into = %current, commit = %id, "merged branch");
        Ok(Some(id))
    }
}
