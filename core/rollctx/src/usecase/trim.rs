//! trim の手順（判定 → 安全な切断位置 → バックアップ → 要約 → 境界挿入 → 保存）

use chrono::SecondsFormat;
use common::error::Error;
use common::ports::outbound::{Clock, IdGenerator, Log, LogLevel, LogRecord};
use crate::domain::boundary::build_boundary;
use crate::domain::synopsis::fallback_synopsis;
use crate::domain::{
    DependencyIndex, Message, SummarySource, TrimOutcome, TrimResult, TrimSettings,
};
use crate::ports::outbound::{Summary, SummaryProvider, Transcript, TranscriptStore};
use std::sync::Arc;

/// TrimUseCase が使うポート一式（wiring が組み立てる）
pub struct TrimDeps {
    pub store: Arc<dyn TranscriptStore>,
    pub summary: Arc<dyn SummaryProvider>,
    pub clock: Arc<dyn Clock>,
    pub id_gen: Arc<dyn IdGenerator>,
    pub log: Arc<dyn Log>,
}

/// 親が残す側に無いメッセージの parent を境界へ付け替える。付け替えた件数を返す。
/// parent が無い（根の）メッセージはそのまま。
pub fn relink_orphans(
    retained: &mut [Message],
    is_kept: impl Fn(&str) -> bool,
    boundary_id: &str,
) -> usize {
    let mut relinked = 0;
    for msg in retained.iter_mut() {
        let orphan = msg.parent_id().map(|parent| !is_kept(parent)).unwrap_or(false);
        if orphan {
            msg.set_parent_id(boundary_id);
            relinked += 1;
        }
    }
    relinked
}

pub struct TrimUseCase {
    settings: TrimSettings,
    deps: TrimDeps,
}

impl TrimUseCase {
    pub fn new(settings: TrimSettings, deps: TrimDeps) -> Self {
        Self { settings, deps }
    }

    pub fn needs_trim(&self, messages: &[Message]) -> bool {
        messages.len() > self.settings.max_messages()
    }

    pub fn calculate_trim_count(&self, messages: &[Message]) -> usize {
        (messages.len() as f64 * self.settings.trim_fraction()).floor() as usize
    }

    fn log(&self, record: LogRecord) {
        let _ = self.deps.log.log(&record.layer("usecase").kind("trim"));
    }

    fn summarize(&self, archived: &[Message], project: &str) -> Summary {
        if self.settings.generate_summaries() {
            self.deps.summary.summarize(archived, project)
        } else {
            Summary {
                text: fallback_synopsis(archived),
                source: SummarySource::Fallback,
            }
        }
    }

    /// transcript を trim する。
    ///
    /// バックアップ失敗は Err（transcript は未変更）。保存失敗は `TrimOutcome::SaveFailed` で、
    /// このとき `transcript.messages` は保存しようとした列になっている。
    pub fn trim(
        &self,
        project: &str,
        transcript: &mut Transcript,
        dry_run: bool,
    ) -> Result<TrimResult, Error> {
        let original_count = transcript.messages.len();
        if !self.needs_trim(&transcript.messages) {
            return Ok(TrimResult::unchanged(
                project,
                original_count,
                TrimOutcome::UnderThreshold,
            ));
        }

        let target = self.calculate_trim_count(&transcript.messages);
        let index = DependencyIndex::build(&transcript.messages);
        let safe_cut = index.find_safe_cut(target).min(original_count);
        self.log(
            LogRecord::new(LogLevel::Debug, "cut computed")
                .field("project", project)
                .field("count", original_count)
                .field("target", target)
                .field("safe_cut", safe_cut),
        );

        if safe_cut == 0 {
            return Ok(TrimResult::unchanged(
                project,
                original_count,
                TrimOutcome::NothingToArchive,
            ));
        }

        let retained_count = original_count - safe_cut;
        if dry_run {
            let archived = &transcript.messages[..safe_cut];
            return Ok(TrimResult {
                project: project.to_string(),
                original_count,
                messages_removed: safe_cut,
                final_count: retained_count + 1,
                outcome: TrimOutcome::DryRun {
                    from: archived.first().map(|m| m.timestamp().to_string()),
                    to: archived.last().map(|m| m.timestamp().to_string()),
                },
            });
        }

        let backup_path = self.deps.store.backup(&transcript.path)?;

        let mut retained = transcript.messages.split_off(safe_cut);
        let archived = std::mem::take(&mut transcript.messages);
        let summary = self.summarize(&archived, project);

        let boundary_id = self.deps.id_gen.next_id();
        let timestamp = self
            .deps
            .clock
            .now_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let boundary = build_boundary(
            &boundary_id,
            &timestamp,
            &archived,
            &retained,
            &summary.text,
        );
        let relinked = relink_orphans(
            &mut retained,
            |id| index.survives_cut(id, safe_cut),
            &boundary_id,
        );

        let mut next = Vec::with_capacity(retained.len() + 1);
        next.push(boundary);
        next.append(&mut retained);
        transcript.messages = next;
        let final_count = transcript.messages.len();

        let outcome = match self.deps.store.save(&transcript.path, &transcript.messages) {
            Ok(()) => {
                self.log(
                    LogRecord::new(LogLevel::Info, "transcript trimmed")
                        .field("project", project)
                        .field("removed", safe_cut)
                        .field("final_count", final_count)
                        .field("relinked", relinked)
                        .field("summary", summary.source.as_str()),
                );
                TrimOutcome::Trimmed {
                    backup_path,
                    summary_source: summary.source,
                }
            }
            Err(e) => {
                self.log(
                    LogRecord::new(LogLevel::Error, format!("Failed to save transcript: {}", e))
                        .field("project", project)
                        .field("backup", backup_path.display().to_string()),
                );
                TrimOutcome::SaveFailed {
                    backup_path,
                    error: e.to_string(),
                }
            }
        };

        Ok(TrimResult {
            project: project.to_string(),
            original_count,
            messages_removed: safe_cut,
            final_count,
            outcome,
        })
    }
}
