use std::collections::VecDeque;

/// 叙述日志行的类别，由行首前缀决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `$ ` 模拟命令
    Command,
    /// `✓` 成功
    Success,
    /// `→` 中间步骤
    Info,
    /// `!` 被拒绝或失败
    Rejected,
    /// `[teammate]` / `[maintainer]` 第三方
    ThirdParty,
    /// 普通命令输出
    Output,
}

impl LineKind {
    pub fn classify(line: &str) -> Self {
        if line.starts_with("$ ") {
            LineKind::Command
        } else if line.starts_with('✓') {
            LineKind::Success
        } else if line.starts_with('→') {
            LineKind::Info
        } else if line.starts_with('!') {
            LineKind::Rejected
        } else if line.starts_with("[teammate]") || line.starts_with("[maintainer]") {
            LineKind::ThirdParty
        } else {
            LineKind::Output
        }
    }
}

/// 把用户输入压成单行：控制字符替换为空格并去除首尾空白
///
/// 日志行的类别由行首前缀决定，输入中的换行会伪造出新的一行。
pub fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// 有界、只追加的叙述日志
///
/// 超出容量时静默丢弃最早的行。`total` 记录历史上写入过的总行数，
/// UI 可以据此只渲染增量。
#[derive(Debug, Clone)]
pub struct EventLog {
    lines: VecDeque<String>,
    capacity: usize,
    total: usize,
    seed: Vec<String>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            total: 0,
            seed: Vec::new(),
        }
    }

    /// 创建带初始内容的日志，`reset` 时会恢复到这些内容
    pub fn seeded<I, S>(capacity: usize, seed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut log = Self::new(capacity);
        log.seed = seed.into_iter().map(Into::into).collect();
        log.reset();
        log
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(kind = ?LineKind::classify(&line), "{}", line);
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        self.total += 1;
    }

    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.push(line);
        }
    }

    /// 恢复到初始内容
    ///
    /// `total` 保持单调递增，初始内容按新写入计数，调用方的增量标记依然有效。
    pub fn reset(&mut self) {
        self.lines.clear();
        let seed = std::mem::take(&mut self.seed);
        self.extend(seed.iter().cloned());
        self.seed = seed;
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.iter().any(|l| l == line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 历史上写入过的总行数（包含已被丢弃的行）
    pub fn total(&self) -> usize {
        self.total
    }

    /// 返回自 `since` 以来新增且仍保留在日志中的行
    pub fn since(&self, since: usize) -> Vec<String> {
        let new_lines = self.total.saturating_sub(since).min(self.lines.len());
        self.lines
            .iter()
            .skip(self.lines.len() - new_lines)
            .cloned()
            .collect()
    }
}
