use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use config::{Config, Environment as EnvironmentSource, File};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use dealcoach::application::ports::{CompletionClient, SpeechSynthesis, SpeechToText};
use dealcoach::application::services::{
    AudioIntakeService, ChecklistAnalyzer, CoachingStrategy, CoachingSynthesizer, LlmCoach,
    PipelineService, PipelineWorker, ScoringEngine, TemplateCoach, TranscriptionService,
};
use dealcoach::infrastructure::llm::OpenAiCompletionClient;
use dealcoach::infrastructure::observability::{init_tracing, TracingConfig};
use dealcoach::infrastructure::persistence::{
    create_pool, PgAudioRepository, PgCoachingRepository, PgScoreRepository, PgSessionRepository,
    PgTranscriptRepository, PgVerdictRepository,
};
use dealcoach::infrastructure::storage::MediaStoreFactory;
use dealcoach::infrastructure::stt::OpenAiWhisperEngine;
use dealcoach::infrastructure::tts::ElevenLabsSynthesizer;
use dealcoach::presentation::config::CoachingStrategySetting;
use dealcoach::presentation::{create_router, AppState, Environment, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let configuration = Config::builder()
        .add_source(
            File::with_name(&environment.config_file_stem()).required(false),
        )
        .add_source(EnvironmentSource::with_prefix("APP").separator("__"))
        .build()
        .context("Failed to build configuration")?;

    let settings: Settings = configuration
        .try_deserialize()
        .context("Failed to deserialize settings")?;

    init_tracing(
        TracingConfig {
            environment: environment.to_string(),
            default_level: settings.logging.level.clone(),
            json_format: settings.logging.enable_json,
        },
        settings.server.port,
    );

    let pool = create_pool(&settings.database.url, settings.database.max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;

    tracing::info!("Running database migrations");
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let sessions = Arc::new(PgSessionRepository::new(pool.clone()));
    let audio = Arc::new(PgAudioRepository::new(pool.clone()));
    let transcripts = Arc::new(PgTranscriptRepository::new(pool.clone()));
    let verdicts = Arc::new(PgVerdictRepository::new(pool.clone()));
    let scores = Arc::new(PgScoreRepository::new(pool.clone()));
    let coaching = Arc::new(PgCoachingRepository::new(pool.clone()));

    let stores = Arc::new(
        MediaStoreFactory::create(&settings.storage)
            .map_err(|e| anyhow::anyhow!("Failed to initialize media storage: {}", e))?,
    );

    let stt: Arc<dyn SpeechToText> = Arc::new(OpenAiWhisperEngine::new(
        &settings.transcription.base_url,
        &settings.transcription.api_key,
        &settings.transcription.model,
        settings.transcription.timeout_seconds,
    ));
    let completions: Arc<dyn CompletionClient> =
        Arc::new(OpenAiCompletionClient::from_settings(&settings.llm));

    let strategy: Arc<dyn CoachingStrategy> = match settings.coaching.strategy {
        CoachingStrategySetting::Template => Arc::new(TemplateCoach),
        CoachingStrategySetting::Llm => Arc::new(LlmCoach::new(Arc::clone(&completions))),
    };
    let narrator: Option<Arc<dyn SpeechSynthesis>> = if settings.tts.enabled {
        Some(Arc::new(ElevenLabsSynthesizer::new(
            &settings.tts.base_url,
            &settings.tts.api_key,
            &settings.tts.model_id,
            settings.tts.timeout_seconds,
        )))
    } else {
        None
    };

    let max_upload_bytes = (settings.storage.max_upload_mb * 1024 * 1024) as u64;
    let intake = Arc::new(AudioIntakeService::new(
        Arc::clone(&stores),
        sessions.clone() as _,
        audio.clone() as _,
        max_upload_bytes,
    ));
    let transcription = Arc::new(TranscriptionService::new(
        Arc::clone(&stores),
        audio.clone() as _,
        transcripts.clone() as _,
        stt,
        settings.transcription.language_hint.clone(),
    ));
    let analyzer = Arc::new(ChecklistAnalyzer::new(
        Arc::clone(&completions),
        transcripts.clone() as _,
        verdicts.clone() as _,
    ));
    let scoring = Arc::new(ScoringEngine::new(
        verdicts.clone() as _,
        scores.clone() as _,
    ));
    let synthesizer = Arc::new(CoachingSynthesizer::new(
        sessions.clone() as _,
        verdicts.clone() as _,
        scores.clone() as _,
        coaching.clone() as _,
        strategy,
        narrator,
        Arc::clone(&stores),
        settings.tts.voice_id.clone(),
    ));

    let (pipeline_tx, pipeline_rx) = mpsc::channel(64);
    let pipeline = Arc::new(PipelineService::new(
        pipeline_tx,
        sessions.clone() as _,
        audio.clone() as _,
        verdicts.clone() as _,
        scores.clone() as _,
        Arc::clone(&scoring),
    ));
    let worker = PipelineWorker::new(
        pipeline_rx,
        sessions.clone() as _,
        transcription,
        analyzer,
        Arc::clone(&synthesizer),
    );
    tokio::spawn(worker.run());

    let state = AppState {
        sessions,
        audio,
        transcripts,
        verdicts,
        scores,
        coaching,
        intake,
        pipeline,
        synthesizer,
    };

    let router = create_router(state, max_upload_bytes as usize);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
