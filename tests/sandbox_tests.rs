/// 提交图沙盒测试
/// 覆盖提交唯一性、分叉点、合并父提交以及完整的分支合并场景

#[cfg(test)]
mod sandbox_tests {
    use git_sim::git::{CommitId, LineKind, MergeEngine, Repository};
    use git_sim::SimError;
    use std::collections::HashSet;

    fn create_test_repo() -> Repository {
        Repository::new(64, Some(2024))
    }

    #[test]
    fn test_commit_ids_unique_and_ordered() {
        let mut repo = create_test_repo();
        let mut created = vec![repo.commits()[0].id];
        for i in 0..20 {
            if i % 5 == 0 {
                repo.create_branch(&format!("topic {}", i)).unwrap();
            }
            created.push(repo.commit(&format!("change {}", i)).unwrap());
        }

        let ids: Vec<CommitId> = repo.commits().iter().map(|c| c.id).collect();
        assert_eq!(ids, created);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let hashes: HashSet<&str> = repo.commits().iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes.len(), repo.commits().len());
    }

    #[test]
    fn test_parents_reference_existing_commits() {
        let mut repo = create_test_repo();
        repo.commit("c2").unwrap();
        repo.create_branch("feature").unwrap();
        repo.commit("f1").unwrap();
        repo.checkout("main").unwrap();
        MergeEngine::merge(&mut repo, "feature").unwrap();

        for (idx, commit) in repo.commits().iter().enumerate() {
            let earlier: HashSet<CommitId> = repo.commits()[..idx].iter().map(|c| c.id).collect();
            assert!(commit.parent_ids.iter().all(|p| earlier.contains(p)));
            match idx {
                0 => assert!(commit.parent_ids.is_empty()),
                _ if commit.is_merge() => assert_eq!(commit.parent_ids.len(), 2),
                _ => assert_eq!(commit.parent_ids.len(), 1),
            }
        }
    }

    #[test]
    fn test_fork_point_correctness() {
        let mut repo = create_test_repo();
        let c2 = repo.commit("c2").unwrap();
        repo.create_branch("F").unwrap();
        assert_eq!(repo.current_branch(), "f");
        assert_eq!(repo.head_of("f").map(|c| c.id), Some(c2));
        assert_eq!(repo.head_of("F").map(|c| c.id), Some(c2));
    }

    #[test]
    fn test_merge_parentage_uses_pre_merge_heads() {
        let mut repo = create_test_repo();
        repo.create_branch("b").unwrap();
        repo.commit("b1").unwrap();
        repo.checkout("main").unwrap();
        repo.commit("a1").unwrap();

        let head_b = repo.head_of("b").unwrap().id;
        let head_a = repo.head_of("main").unwrap().id;
        let merge = MergeEngine::merge(&mut repo, "b").unwrap().unwrap();
        assert_eq!(repo.find_commit(merge).unwrap().parent_ids, vec![head_b, head_a]);
        // 被合并的分支头不变
        assert_eq!(repo.head_of("b").unwrap().id, head_b);
    }

    #[test]
    fn test_feature_merge_scenario() {
        let mut repo = create_test_repo();
        let c1 = repo.commits()[0].id;

        repo.create_branch("feature").unwrap();
        assert_eq!(repo.head_of("feature").map(|c| c.id), Some(c1));

        let f1 = repo.commit("f1").unwrap();
        repo.checkout("main").unwrap();
        let c2 = repo.commit("c2").unwrap();

        let m = MergeEngine::merge(&mut repo, "feature").unwrap().unwrap();
        let merge = repo.find_commit(m).unwrap();
        assert_eq!(merge.parent_ids, vec![f1, c2]);
        assert_eq!(merge.message, "Merge 'feature' into main");
        assert_eq!(repo.head_of("main").map(|c| c.id), Some(m));
        assert_eq!(repo.merges().len(), 1);
        assert_eq!(repo.merges()[0].to_branch, "main");

        let log = repo.log().to_vec();
        let tail = &log[log.len() - 3..];
        assert_eq!(tail[0], "$ git merge feature");
        assert_eq!(tail[1], "Merge made by the 'ort' strategy.");
        assert!(tail[2].starts_with("[main ") && tail[2].ends_with("] Merge 'feature' into main"));
    }

    #[test]
    fn test_duplicate_branch_rejected_without_mutation() {
        let mut repo = create_test_repo();
        repo.create_branch("feature").unwrap();
        repo.checkout("main").unwrap();
        let before = repo.snapshot();

        let err = repo.create_branch(" Feature ").unwrap_err();
        assert_eq!(err, SimError::BranchExists { name: "feature".into() });
        let after = repo.snapshot();
        assert_eq!(after.branches, before.branches);
        assert_eq!(after.current_branch, "main");
        assert_eq!(LineKind::classify(repo.log().last().unwrap()), LineKind::Rejected);
    }

    #[test]
    fn test_raw_branch_name_resolves_like_create() {
        let mut repo = create_test_repo();
        assert_eq!(repo.create_branch("My Feature").unwrap(), "my-feature");
        let f1 = repo.commit("f1").unwrap();
        repo.checkout("main").unwrap();

        assert_eq!(repo.checkout("  My   Feature ").unwrap(), true);
        assert_eq!(repo.current_branch(), "my-feature");
        repo.checkout("main").unwrap();

        let m = MergeEngine::merge(&mut repo, "My Feature").unwrap().unwrap();
        assert_eq!(repo.find_commit(m).unwrap().parent_ids[0], f1);
        assert_eq!(repo.head_of("MY FEATURE").map(|c| c.id), Some(f1));
    }

    #[test]
    fn test_commit_message_newline_folded() {
        let mut repo = create_test_repo();
        let id = repo.commit("fix\n! fake rejection").unwrap();
        assert_eq!(repo.find_commit(id).unwrap().message, "fix ! fake rejection");
        assert!(repo
            .log()
            .lines()
            .all(|l| LineKind::classify(l) != LineKind::Rejected));
    }

    #[test]
    fn test_log_is_bounded() {
        let mut repo = Repository::new(16, Some(1));
        for i in 0..30 {
            repo.commit(&format!("commit {}", i)).unwrap();
        }
        assert_eq!(repo.log().len(), 16);
        assert_eq!(repo.log().last(), Some("1 file(s) changed"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut repo = create_test_repo();
        repo.create_file(Some("index.html"));
        repo.stage_all().unwrap();
        let json = serde_json::to_value(repo.snapshot()).unwrap();
        assert_eq!(json["current_branch"], "main");
        assert_eq!(json["staged_files"][1], "index.html");
        assert_eq!(json["commits"][0]["message"], "Initial commit");
    }
}
