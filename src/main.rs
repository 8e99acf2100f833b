use clap::Parser;
use git_sim::cli::{Args, LineOutput, Shell};
use git_sim::config::SimConfig;
use git_sim::infrastructure::logging::{setup_logging, LoggingConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

fn print_output(output: &LineOutput) {
    for line in &output.lines {
        println!("{}", line);
    }
    for note in &output.notes {
        println!("{}", note);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = SimConfig::load(args.config.as_deref())?;
    config.update_from_args(&args);
    config.validate()?;

    setup_logging(LoggingConfig::from_sim_config(&config))?;
    tracing::debug!(?config, widget = ?args.widget, "starting simulator");

    let mut shell = Shell::new(args.widget, &config, args.json)?;

    // 先输出初始日志
    for line in shell.log().lines() {
        println!("{}", line);
    }

    if let Some(script) = &args.script {
        for line in script.split(';') {
            let output = shell.run_line(line).await;
            print_output(&output);
            if output.quit {
                break;
            }
        }
        return Ok(());
    }

    println!("{}", git_sim::cli::commands::help(shell.widget()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let output = shell.run_line(&line).await;
        print_output(&output);
        if output.quit {
            break;
        }
    }

    Ok(())
}
