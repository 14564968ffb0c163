use crate::domain::{Overrides, ProjectSelection, RollCommand};
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::error::Error;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub help: bool,
    /// -c / --config: 設定ファイルを明示する
    pub config_path: Option<PathBuf>,
    pub project: Option<String>,
    /// -a / --all: 設定済みの全プロジェクト
    pub all: bool,
    pub dry_run: bool,
    pub trim: bool,
    pub status: bool,
    /// --file: 自動検出せずこの transcript を使う
    pub file: Option<PathBuf>,
    /// -v / --verbose: 構造化ログを stderr にも出す
    pub verbose: bool,
    pub overrides: Overrides,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

pub(crate) fn build_clap_command() -> clap::Command {
    clap::Command::new("rollctx")
        .about("Keep conversation transcripts under a message budget by archiving the oldest part")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .value_name("path")
                .help("Path to config.json")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("project")
                .short('p')
                .long("project")
                .value_name("name")
                .help("Process a single configured project")
                .conflicts_with("all")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("all")
                .short('a')
                .long("all")
                .help("Process all configured projects")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Report what would be trimmed without changing anything")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("trim")
                .short('t')
                .long("trim")
                .help("Trim transcripts that exceed the message budget")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("max-messages")
                .short('m')
                .long("max-messages")
                .value_name("n")
                .help("Trim when a transcript has more than n messages")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("trim-fraction")
                .short('f')
                .long("trim-fraction")
                .value_name("fraction")
                .help("Fraction of messages to archive, in [0, 1)")
                .value_parser(value_parser!(f64))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("no-summary")
                .long("no-summary")
                .help("Do not call the summary API (use the built-in synopsis)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("status")
                .short('s')
                .long("status")
                .help("Show message counts for the selected projects")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("file")
                .long("file")
                .value_name("path")
                .help("Use this transcript instead of the newest one")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("api-key")
                .long("api-key")
                .value_name("key")
                .help("Summary API key (default: config or OPENROUTER_API_KEY)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("api-url")
                .long("api-url")
                .value_name("url")
                .help("Chat completions endpoint")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("api-model")
                .long("api-model")
                .value_name("model")
                .help("Model used for summaries")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Emit structured logs to stderr as well")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    let overrides = Overrides {
        max_messages: matches.get_one::<usize>("max-messages").copied(),
        trim_fraction: matches.get_one::<f64>("trim-fraction").copied(),
        no_summary: matches.get_flag("no-summary"),
        api_key: matches.get_one::<String>("api-key").cloned(),
        api_url: matches.get_one::<String>("api-url").cloned(),
        api_model: matches.get_one::<String>("api-model").cloned(),
    };
    Config {
        help: matches.get_flag("help"),
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        project: matches.get_one::<String>("project").cloned(),
        all: matches.get_flag("all"),
        dry_run: matches.get_flag("dry-run"),
        trim: matches.get_flag("trim"),
        status: matches.get_flag("status"),
        file: matches.get_one::<PathBuf>("file").cloned(),
        verbose: matches.get_flag("verbose"),
        overrides,
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }
    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

/// テスト用: 引数スライスから解析する
#[allow(dead_code)]
pub fn parse_args_from(args: &[&str]) -> Result<Config, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_config(&matches))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "rollctx", &mut std::io::stdout());
}

/// Config を RollCommand に変換する
///
/// - `--status` はプロジェクト未指定なら全件
/// - trim は `--project` / `--all` のどちらも無ければヘルプ
/// - `--dry-run` / `--trim` のどちらも無ければ usage エラー（両方なら dry-run）
pub fn config_to_command(config: &Config) -> Result<RollCommand, Error> {
    if config.help {
        return Ok(RollCommand::Help);
    }

    let selection = match (&config.project, config.all) {
        (Some(name), _) => Some(ProjectSelection::Named(name.clone())),
        (None, true) => Some(ProjectSelection::All),
        (None, false) => None,
    };

    if config.status {
        return Ok(RollCommand::Status {
            selection: selection.unwrap_or(ProjectSelection::All),
            file: config.file.clone(),
        });
    }

    let Some(selection) = selection else {
        return Ok(RollCommand::Help);
    };

    if !config.dry_run && !config.trim {
        return Err(Error::invalid_argument(
            "Specify --dry-run to preview or --trim to apply changes",
        ));
    }

    Ok(RollCommand::Trim {
        selection,
        file: config.file.clone(),
        dry_run: config.dry_run,
    })
}
