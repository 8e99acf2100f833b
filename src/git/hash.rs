use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 哈希长度，与 `git log --oneline` 的短哈希一致
pub const HASH_LEN: usize = 7;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// 提交标识符，在所属仓库内单调递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(pub u64);

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 标识符生成器
///
/// 同时负责两件事：单调递增的 [`CommitId`] 和伪随机的短哈希。
/// 短哈希只用于展示，但同一个生成器发出的哈希不会重复。
#[derive(Debug)]
pub struct IdentifierGenerator {
    rng: StdRng,
    next_id: u64,
    issued: HashSet<String>,
}

impl IdentifierGenerator {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// 使用固定种子，便于测试复现
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// 根据可选种子创建
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            next_id: 1,
            issued: HashSet::new(),
        }
    }

    pub fn next_id(&mut self) -> CommitId {
        let id = CommitId(self.next_id);
        self.next_id += 1;
        id
    }

    /// 生成一个未发出过的短哈希
    pub fn next_hash(&mut self) -> String {
        loop {
            let hash: String = (0..HASH_LEN)
                .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
                .collect();
            if self.issued.insert(hash.clone()) {
                return hash;
            }
            tracing::debug!(%hash, "hash collision, drawing again");
        }
    }

    /// 在 `0..len` 中随机选一个下标，`len` 必须大于 0
    pub fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// 回到初始计数，保留随机源
    pub fn restart(&mut self) {
        self.next_id = 1;
        self.issued.clear();
    }
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// 截取短哈希用于叙述日志
pub fn short(hash: &str) -> &str {
    let end = hash
        .char_indices()
        .nth(HASH_LEN)
        .map(|(idx, _)| idx)
        .unwrap_or(hash.len());
    &hash[..end]
}
