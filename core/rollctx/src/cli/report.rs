//! usecase の結果をコンソール表示用の行にする

use crate::domain::synopsis::date_or_unknown;
use crate::domain::TrimOutcome;
use crate::usecase::{ProjectOutcome, ProjectReport, StatusReport, StatusState};

pub fn banner(now_local: &str) -> String {
    format!("Rolling Context Manager - {}", now_local)
}

/// status 1 件 = 1 行
pub fn status_line(report: &StatusReport, max_messages: usize) -> String {
    let body = match &report.state {
        StatusState::UnknownProject => "Unknown project".to_string(),
        StatusState::NotFound => "No transcript found".to_string(),
        StatusState::Locked => "LOCKED (transcript in use)".to_string(),
        StatusState::Failed(e) => format!("Error: {}", e),
        StatusState::Loaded {
            count,
            first,
            last,
            needs_trim,
        } => {
            let verdict = if *needs_trim {
                format!("NEEDS TRIM ({} > {})", count, max_messages)
            } else {
                "OK".to_string()
            };
            format!("{} messages ({} to {}) - {}", count, first, last, verdict)
        }
    };
    format!("{}: {}", report.name, body)
}

/// trim 1 プロジェクト分の表示行
pub fn project_lines(report: &ProjectReport, max_messages: usize) -> Vec<String> {
    let mut lines = vec![format!("[{}]", report.name)];
    match &report.outcome {
        ProjectOutcome::UnknownProject => {
            lines.push(format!("  Unknown project: {}", report.name));
        }
        ProjectOutcome::NotFound => lines.push("  No transcript found".to_string()),
        ProjectOutcome::Locked(path) => {
            lines.push(format!("  Transcript is locked (in use): {}", path.display()));
            lines.push("  Skipping; try again when the session is closed".to_string());
        }
        ProjectOutcome::Failed { path, error } => {
            lines.push(format!("  Transcript: {}", path.display()));
            lines.push(format!("  Error: {}", error));
        }
        ProjectOutcome::Done {
            path,
            loaded,
            skipped_lines,
            result,
        } => {
            lines.push(format!("  Transcript: {}", path.display()));
            if *skipped_lines > 0 {
                lines.push(format!(
                    "  Loaded {} messages ({} malformed lines skipped)",
                    loaded, skipped_lines
                ));
            } else {
                lines.push(format!("  Loaded {} messages", loaded));
            }
            match &result.outcome {
                TrimOutcome::UnderThreshold => lines.push(format!(
                    "  Under threshold ({} <= {}), skipping",
                    result.original_count, max_messages
                )),
                TrimOutcome::NothingToArchive => lines.push(
                    "  Nothing to archive (no safe cut point), skipping".to_string(),
                ),
                TrimOutcome::DryRun { from, to } => {
                    lines.push(format!(
                        "  Would trim {} messages ({} to {})",
                        result.messages_removed,
                        date_or_unknown(from.as_deref()),
                        date_or_unknown(to.as_deref())
                    ));
                    lines.push(format!("  Final count would be: {}", result.final_count));
                }
                TrimOutcome::Trimmed {
                    backup_path,
                    summary_source,
                } => {
                    lines.push(format!("  Trimmed {} messages", result.messages_removed));
                    lines.push(format!("  Backup: {}", backup_path.display()));
                    lines.push(format!("  Summary: {}", summary_source.as_str()));
                    lines.push(format!("  Final count: {}", result.final_count));
                }
                TrimOutcome::SaveFailed { backup_path, error } => {
                    lines.push(format!("  Failed to save trimmed transcript: {}", error));
                    lines.push(format!("  Backup: {}", backup_path.display()));
                    lines.push("  Transcript left unchanged".to_string());
                }
            }
        }
    }
    lines
}
