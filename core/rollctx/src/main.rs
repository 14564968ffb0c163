mod adapter;
mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::process;
use std::sync::Arc;

use adapter::ConfigLoader;
use cli::report::{banner, project_lines, status_line};
use cli::{config_to_command, parse_args, print_completion, ParseOutcome};
use common::adapter::{StdEnvResolver, StdFileSystem};
use common::error::Error;
use common::ports::outbound::{EnvResolver, FileSystem, LogLevel, LogRecord};
use domain::{ProjectSelection, RollCommand};
use ports::inbound::UseCaseRunner;
use wiring::{build_logger, wire_rollctx, App};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl Runner {
    fn log_lifecycle(&self, message: &str, command: &str, exit_code: Option<i32>) {
        let mut record = LogRecord::new(LogLevel::Info, message)
            .layer("cli")
            .kind("lifecycle")
            .field("command", command);
        if let Some(code) = exit_code {
            record = record.field("exit_code", code);
        }
        let _ = self.app.logger.log(&record);
    }

    fn print_banner(&self) {
        let now = self
            .app
            .clock
            .now_utc()
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        println!("{}", banner(&now));
        println!();
    }

    fn warn_if_no_projects(&self, selection: &ProjectSelection) {
        if *selection == ProjectSelection::All && self.app.use_case.settings().projects.is_empty() {
            println!("No projects configured. Add a \"projects\" map to config.json.");
        }
    }
}

impl UseCaseRunner for Runner {
    fn run(&self, command: RollCommand) -> Result<i32, Error> {
        let command_name = cmd_name_for_log(&command);
        self.log_lifecycle("command started", command_name, None);

        let max_messages = self.app.use_case.settings().trim.max_messages();
        let code = match command {
            RollCommand::Help => {
                print_help();
                0
            }
            RollCommand::Status { selection, file } => {
                self.print_banner();
                self.warn_if_no_projects(&selection);
                let reports = self.app.use_case.status(&selection, file.as_deref());
                for report in &reports {
                    println!("{}", status_line(report, max_messages));
                }
                if reports.iter().any(|r| r.is_failure()) {
                    1
                } else {
                    0
                }
            }
            RollCommand::Trim {
                selection,
                file,
                dry_run,
            } => {
                self.print_banner();
                if dry_run {
                    println!("DRY RUN: no files will be changed");
                    println!();
                }
                self.warn_if_no_projects(&selection);
                let reports = self
                    .app
                    .use_case
                    .run_trim(&selection, file.as_deref(), dry_run);
                for report in &reports {
                    for line in project_lines(report, max_messages) {
                        println!("{}", line);
                    }
                    println!();
                }
                if reports.iter().any(|r| r.is_failure()) {
                    1
                } else {
                    0
                }
            }
        };

        self.log_lifecycle("command finished", command_name, Some(code));
        Ok(code)
    }
}

fn cmd_name_for_log(cmd: &RollCommand) -> &'static str {
    match cmd {
        RollCommand::Help => "help",
        RollCommand::Status { .. } => "status",
        RollCommand::Trim { dry_run: true, .. } => "dry-run",
        RollCommand::Trim { .. } => "trim",
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("rollctx: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    let command = config_to_command(&config)?;
    if command == RollCommand::Help {
        print_help();
        return Ok(0);
    }

    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env: Arc<dyn EnvResolver> = Arc::new(StdEnvResolver);
    let logger = build_logger(Arc::clone(&fs), env.as_ref(), config.verbose);
    let settings = ConfigLoader::new(fs, env)
        .load(config.config_path.as_deref())
        .and_then(|s| s.apply(&config.overrides))
        .map_err(|e| {
            let _ = logger.log(
                &LogRecord::new(LogLevel::Error, e.to_string())
                    .layer("cli")
                    .kind("error"),
            );
            e
        })?;

    let app = wire_rollctx(settings, logger);
    Runner { app }.run(command)
}

fn print_usage() {
    eprintln!("Usage: rollctx [options] (--project <name> | --all) (--dry-run | --trim)");
    eprintln!("       rollctx --status [--project <name>]");
}

fn print_help() {
    println!("Usage: rollctx [options] (--project <name> | --all) (--dry-run | --trim)");
    println!("       rollctx --status [--project <name>]");
    println!("Options:");
    println!("  -h, --help                     Show this help message");
    println!("  -c, --config <path>            Use this config.json instead of the default location");
    println!("  -p, --project <name>           Process a single configured project");
    println!("  -a, --all                      Process all configured projects");
    println!("  -n, --dry-run                  Report what would be trimmed without changing anything");
    println!("  -t, --trim                     Trim transcripts over the message budget (a backup is taken first)");
    println!("  -s, --status                   Show message counts (all projects unless -p is given)");
    println!("  -m, --max-messages <n>         Trim when a transcript has more than n messages (default: 200)");
    println!("  -f, --trim-fraction <f>        Fraction of messages to archive, in [0, 1) (default: 0.40)");
    println!("      --no-summary               Do not call the summary API; use the built-in synopsis");
    println!("      --file <path>              Use this transcript instead of the newest one");
    println!("                                 (relative paths resolve under the project directory when one project is selected)");
    println!("      --api-key <key>            Summary API key");
    println!("      --api-url <url>            Chat completions endpoint (default: OpenRouter)");
    println!("      --api-model <model>        Model used for summaries");
    println!("  -v, --verbose                  Emit structured logs to stderr as well");
    println!("      --generate <shell>         Generate shell completion script (bash, zsh, fish, ...)");
    println!();
    println!("Environment:");
    println!("  ROLLCTX_HOME        Config directory. Config: $ROLLCTX_HOME/config.json");
    println!("                      If unset, $XDG_CONFIG_HOME/rollctx (e.g. ~/.config/rollctx) is used.");
    println!("  OPENROUTER_API_KEY  Summary API key when config.json has none");
    println!("  XDG_STATE_HOME      Logs: $XDG_STATE_HOME/rollctx/logs/rollctx.jsonl (default ~/.local/state)");
    println!();
    println!("Description:");
    println!("  Keeps conversation transcripts under a message budget. The oldest part of a");
    println!("  transcript is archived to .backups and replaced by a single boundary message");
    println!("  carrying a summary, without splitting a tool call from its result.");
    println!();
    println!("Examples:");
    println!("  rollctx --status");
    println!("  rollctx -p myproject --dry-run");
    println!("  rollctx --all --trim --no-summary");
}
