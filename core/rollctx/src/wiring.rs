//! 配線: 標準アダプタで UseCase を組み立てる

use std::sync::Arc;

use common::adapter::{
    CompositeLog, FileJsonLog, NoopLog, StderrLog, StdClock, StdFileLock, StdFileSystem,
    StdIdGenerator,
};
use common::llm::OpenAiCompatProvider;
use common::ports::outbound::{
    Clock, EnvResolver, FileLock, FileSystem, IdGenerator, LlmProvider, Log, LogLevel,
};

use crate::adapter::config_loader::{APP_NAME, HOME_VAR};
use crate::adapter::{JsonlTranscriptStore, LlmSummaryProvider};
use crate::domain::{ApiSettings, Settings};
use crate::ports::outbound::{SummaryProvider, TranscriptStore};
use crate::usecase::{RollingContextUseCase, TrimDeps, TrimUseCase};

const LOG_FILE_NAME: &str = "rollctx.jsonl";
/// 要約 API へ送るアプリ識別ヘッダ
const APP_REFERER: &str = "http://localhost/rollctx";
const APP_TITLE: &str = "rollctx";

/// 配線で組み立てたもの（main の Command ディスパッチで利用）
pub struct App {
    pub use_case: RollingContextUseCase,
    /// 構造化ログ（ファイルへ JSONL、--verbose なら stderr にも）
    pub logger: Arc<dyn Log>,
    pub clock: Arc<dyn Clock>,
}

/// ログ出力先。state ディレクトリが解決できなければファイルへは出さない。
pub fn build_logger(
    fs: Arc<dyn FileSystem>,
    env: &dyn EnvResolver,
    verbose: bool,
) -> Arc<dyn Log> {
    let file_log: Arc<dyn Log> = env
        .resolve_dirs(APP_NAME, HOME_VAR)
        .map(|dirs| {
            Arc::new(FileJsonLog::new(fs, dirs.logs_dir().join(LOG_FILE_NAME))) as Arc<dyn Log>
        })
        .unwrap_or_else(|_| Arc::new(NoopLog));
    if verbose {
        Arc::new(CompositeLog::new(vec![
            file_log,
            Arc::new(StderrLog::new(LogLevel::Debug)),
        ]))
    } else {
        file_log
    }
}

/// キーが無ければ None（要約は常に決定的なものになる）
pub fn build_llm(api: &ApiSettings) -> Option<Arc<dyn LlmProvider>> {
    if !api.is_configured() {
        return None;
    }
    let provider = OpenAiCompatProvider::new(api.model.clone(), api.url.clone(), api.key.clone())
        .with_header("HTTP-Referer", APP_REFERER)
        .with_header("X-Title", APP_TITLE);
    Some(Arc::new(provider))
}

/// 配線: 標準アダプタで App を組み立てる
pub fn wire_rollctx(settings: Settings, logger: Arc<dyn Log>) -> App {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let clock: Arc<dyn Clock> = Arc::new(StdClock);
    let lock: Arc<dyn FileLock> = Arc::new(StdFileLock);
    let id_gen: Arc<dyn IdGenerator> = Arc::new(StdIdGenerator);

    let store: Arc<dyn TranscriptStore> = Arc::new(JsonlTranscriptStore::new(
        fs,
        lock,
        Arc::clone(&clock),
        Arc::clone(&logger),
        settings.backup_keep_count,
    ));
    let summary: Arc<dyn SummaryProvider> = Arc::new(LlmSummaryProvider::new(
        build_llm(&settings.api),
        settings.summary_custom_prompt.clone(),
        Arc::clone(&logger),
    ));
    let trim = TrimUseCase::new(
        settings.trim,
        TrimDeps {
            store: Arc::clone(&store),
            summary,
            clock: Arc::clone(&clock),
            id_gen,
            log: Arc::clone(&logger),
        },
    );
    let use_case = RollingContextUseCase::new(settings, store, trim, Arc::clone(&logger));
    App {
        use_case,
        logger,
        clock,
    }
}
