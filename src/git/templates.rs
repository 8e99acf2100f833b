use crate::git::flow::PrStep;
use crate::infrastructure::error::SimError;
use handlebars::Handlebars;
use serde::Serialize;

/// 渲染 PR 流程叙述时可用的变量
#[derive(Debug, Clone, Serialize)]
pub struct FlowContext {
    pub branch: String,
    pub commit_message: String,
    pub pr_title: String,
    pub review_comment: String,
    pub pr_number: u32,
}

const FORKED: &str = r#"
→ Navigating to github.com/awesome-project/repo
→ Clicked 'Fork' button
✓ Forked to github.com/you/repo
"#;

const CLONED: &str = r#"
$ git clone https://github.com/you/repo.git
Cloning into 'repo'...
✓ Repository cloned successfully
"#;

const BRANCHED: &str = r#"
$ git checkout -b {{branch}}
Switched to a new branch '{{branch}}'
"#;

const COMMITTED: &str = r#"
$ git add .
$ git commit -m "{{commit_message}}"
[{{branch}} abc1234] {{commit_message}}
"#;

const PUSHED: &str = r#"
$ git push origin {{branch}}
Enumerating objects: 5, done.
✓ Branch pushed to your fork
"#;

const PR_OPENED: &str = r#"
→ Opening PR: "{{pr_title}}"
→ base: main ← compare: {{branch}}
✓ Pull Request #{{pr_number}} created!
"#;

const REVIEWED: &str = r#"
[maintainer] Review: "{{review_comment}}"
✓ Changes approved!
"#;

const MERGED: &str = r#"
→ Maintainer clicked 'Merge pull request'
✓ Pull request #{{pr_number}} merged!
🎉 Congratulations! You're an open-source contributor!
"#;

/// PR 流程每一步对应的多行日志模板
pub struct FlowTemplates {
    handlebars: Handlebars<'static>,
}

impl FlowTemplates {
    pub fn new() -> Result<Self, SimError> {
        let mut handlebars = Handlebars::new();
        // 日志是纯文本，不做 HTML 转义
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        let mut templates = Self { handlebars };
        for (step, template) in [
            (PrStep::Forked, FORKED),
            (PrStep::Cloned, CLONED),
            (PrStep::Branched, BRANCHED),
            (PrStep::Committed, COMMITTED),
            (PrStep::Pushed, PUSHED),
            (PrStep::PrOpened, PR_OPENED),
            (PrStep::Reviewed, REVIEWED),
            (PrStep::Merged, MERGED),
        ] {
            templates.register(step, template)?;
        }
        Ok(templates)
    }

    /// 注册或覆盖某一步的模板
    pub fn register(&mut self, step: PrStep, template: &str) -> Result<(), SimError> {
        self.handlebars
            .register_template_string(step.as_str(), template.trim())?;
        Ok(())
    }

    pub fn has(&self, step: PrStep) -> bool {
        self.handlebars.has_template(step.as_str())
    }

    /// 渲染某一步的模板，按行返回，忽略空行
    pub fn render(&self, step: PrStep, context: &FlowContext) -> Result<Vec<String>, SimError> {
        let rendered = self.handlebars.render(step.as_str(), context)?;
        Ok(rendered
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl std::fmt::Debug for FlowTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowTemplates")
            .field("templates", &self.handlebars.get_templates().len())
            .finish()
    }
}
