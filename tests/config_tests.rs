/// 配置加载测试
/// 验证 TOML 文件、环境变量和命令行参数的优先级

#[cfg(test)]
mod config_tests {
    use clap::Parser;
    use git_sim::cli::Args;
    use git_sim::config::SimConfig;
    use git_sim::infrastructure::logging::{LogFormat, LogOutput, LoggingConfig};
    use std::env;
    use std::io::Write;

    const ENV_KEYS: [&str; 11] = [
        "GIT_SIM_CONFIG",
        "GIT_SIM_SANDBOX_LOG_CAPACITY",
        "GIT_SIM_SYNC_LOG_CAPACITY",
        "GIT_SIM_PR_LOG_CAPACITY",
        "GIT_SIM_TRANSFER_DELAY_MS",
        "GIT_SIM_REMOTE_URL",
        "GIT_SIM_HASH_SEED",
        "GIT_SIM_LOG_LEVEL",
        "GIT_SIM_LOG_FORMAT",
        "GIT_SIM_LOG_OUTPUT",
        "GIT_SIM_LOG_FILTER",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    // 环境变量是进程级共享状态，所有涉及环境变量的断言放在同一个测试里顺序执行
    #[test]
    fn test_config_sources_priority() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "transfer_delay_ms = 250").unwrap();
        writeln!(file, "sync_log_capacity = 5").unwrap();
        writeln!(file, "remote_url = \"https://example.com/team/repo.git\"").unwrap();
        writeln!(file, "log_format = \"pretty\"").unwrap();

        // 文件覆盖默认值
        let config = SimConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.transfer_delay_ms, 250);
        assert_eq!(config.sync_log_capacity, 5);
        assert_eq!(config.remote_url, "https://example.com/team/repo.git");
        assert_eq!(config.pr_log_capacity, 15);
        assert_eq!(config.log_format, LogFormat::Pretty);

        // 环境变量覆盖文件
        env::set_var("GIT_SIM_TRANSFER_DELAY_MS", "10");
        env::set_var("GIT_SIM_HASH_SEED", "99");
        env::set_var("GIT_SIM_PR_LOG_CAPACITY", "not-a-number");
        env::set_var("GIT_SIM_LOG_FORMAT", "json");
        env::set_var("GIT_SIM_LOG_OUTPUT", "stdout");
        let config = SimConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        let logging = LoggingConfig::from_sim_config(&config);
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.output, LogOutput::Stdout);
        assert_eq!(config.transfer_delay_ms, 10);
        assert_eq!(config.hash_seed, Some(99));
        assert_eq!(config.pr_log_capacity, 15);

        // GIT_SIM_CONFIG 指定文件
        env::set_var("GIT_SIM_CONFIG", &path);
        let config = SimConfig::load(None).unwrap();
        assert_eq!(config.sync_log_capacity, 5);

        // 命令行参数优先级最高
        let args = Args::try_parse_from([
            "git-sim",
            "--delay-ms",
            "0",
            "--seed",
            "1",
            "-l",
            "debug",
            "--log-format",
            "compact",
            "--log-file",
            "sim.log",
        ])
        .unwrap();
        let mut config = config;
        config.update_from_args(&args);
        assert_eq!(config.transfer_delay_ms, 0);
        assert_eq!(config.hash_seed, Some(1));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(
            LoggingConfig::from_sim_config(&config).output,
            LogOutput::File("sim.log".to_string())
        );

        // 校验失败
        env::set_var("GIT_SIM_SANDBOX_LOG_CAPACITY", "0");
        assert!(SimConfig::load(Some(path.as_path())).is_err());

        // 显式指定但不存在的文件
        clear_env();
        assert!(SimConfig::load(Some(dir.path().join("missing.toml").as_path())).is_err());
        clear_env();
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "transfer_delay_ms = \"soon\"").unwrap();
        assert!(SimConfig::from_file(&path).is_err());
    }
}
