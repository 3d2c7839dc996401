//! Command-line driver for the fireside generation client.
//!
//! One subcommand per backend operation: orchestrated jobs (image,
//! story, translate-audio) stream progress to the log and write their
//! artifacts to the output directory; the one-shot helpers print to
//! stdout.

mod config;

use anyhow::{bail, Context};
use fireside_comfy::{ComfyBackend, TextToImageWorkflow};
use fireside_engine::{ArtifactMap, JobBackend, JobOrchestrator};
use fireside_speech::{AudioTranslationBackend, AudioTranslationRequest, SpeechApi};
use fireside_story::{api::ChatRequest, StoryApi, StoryBackend, StoryRequest};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ClientConfig;

const USAGE: &str = "\
Usage: fireside <command> [args]

  image <checkpoint> <prompt...>          generate an image
  story <model> <chapters> <subject...>   generate a multi-chapter story
  translate-audio <file> <from> <to>      translate a recording
  chat <model> <prompt...>                one-shot text generation
  translate <from> <to> <sentence...>     one-shot text translation
  tts <sentence...>                       synthesize speech
  stt <file>                              transcribe a recording
  models                                  list available text models
";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fireside=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let outcome = match args.split_first() {
        Some((command, rest)) => dispatch(&config, command, rest).await,
        None => {
            eprint!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(e) = outcome {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

async fn dispatch(config: &ClientConfig, command: &str, args: &[String]) -> anyhow::Result<()> {
    match command {
        "image" => run_image(config, args).await,
        "story" => run_story(config, args).await,
        "translate-audio" => run_translate_audio(config, args).await,
        "chat" => run_chat(config, args).await,
        "translate" => run_translate(config, args).await,
        "tts" => run_tts(config, args).await,
        "stt" => run_stt(config, args).await,
        "models" => run_models(config).await,
        other => {
            eprint!("{USAGE}");
            bail!("unknown command: {other}");
        }
    }
}

// ---- orchestrated jobs ----

async fn run_image(config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    let [checkpoint, prompt @ ..] = args else {
        bail!("usage: fireside image <checkpoint> <prompt...>");
    };
    if prompt.is_empty() {
        bail!("usage: fireside image <checkpoint> <prompt...>");
    }

    let backend = match &config.comfy_client_id {
        Some(client_id) => ComfyBackend::with_client_id(
            config.comfy_api_url.clone(),
            config.comfy_ws_url.clone(),
            client_id.clone(),
        ),
        None => ComfyBackend::new(config.comfy_api_url.clone(), config.comfy_ws_url.clone()),
    };

    let workflow = TextToImageWorkflow::new(prompt.join(" "), checkpoint.clone()).build();
    let artifacts = run_job(backend, &workflow).await?;
    write_artifacts(config, &artifacts)
}

async fn run_story(config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    let [model, chapters, subject @ ..] = args else {
        bail!("usage: fireside story <model> <chapters> <subject...>");
    };
    if subject.is_empty() {
        bail!("usage: fireside story <model> <chapters> <subject...>");
    }
    let chapter_count: u32 = chapters
        .parse()
        .context("chapter count must be a number")?;

    let backend = StoryBackend::new(config.story_api_url.clone(), config.story_ws_url.clone());
    let request = StoryRequest {
        model: model.clone(),
        subject: subject.join(" "),
        chapter_count,
    };

    let artifacts = run_job(backend, &request).await?;
    for (name, entries) in &artifacts {
        for artifact in entries {
            if let Some(text) = artifact.as_text() {
                println!("== {name} ==\n{text}\n");
            }
        }
    }
    Ok(())
}

async fn run_translate_audio(config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    let [file, from_code, to_code] = args else {
        bail!("usage: fireside translate-audio <file> <from> <to>");
    };

    let audio = std::fs::read(file).with_context(|| format!("failed to read {file}"))?;
    let filename = std::path::Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.ogg".to_string());

    let backend =
        AudioTranslationBackend::new(config.speech_api_url.clone(), config.speech_ws_url.clone());
    let request = AudioTranslationRequest {
        audio,
        filename,
        from_code: from_code.clone(),
        to_code: to_code.clone(),
    };

    let artifacts = run_job(backend, &request).await?;
    write_artifacts(config, &artifacts)
}

/// Run one orchestrated job: progress to the log, Ctrl-C cancels.
async fn run_job<B: JobBackend>(backend: B, payload: &B::Payload) -> anyhow::Result<ArtifactMap> {
    let orchestrator = JobOrchestrator::new(backend).on_progress(|update| {
        tracing::info!(job_id = %update.job_id, progress = %update.payload, "Progress");
    });

    cancel_on_ctrl_c(orchestrator.cancel_handle());

    let artifacts = orchestrator.run(payload).await?;
    Ok(artifacts)
}

fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling job");
            cancel.cancel();
        }
    });
}

fn write_artifacts(config: &ClientConfig, artifacts: &ArtifactMap) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;

    for (name, entries) in artifacts {
        for (index, artifact) in entries.iter().enumerate() {
            let filename = artifact
                .filename
                .clone()
                .unwrap_or_else(|| format!("{name}-{index}.bin"));
            let path = config.output_dir.join(filename);
            std::fs::write(&path, &artifact.data)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(output = %name, path = %path.display(), "Artifact written");
        }
    }
    Ok(())
}

// ---- one-shot helpers ----

async fn run_chat(config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    let [model, prompt @ ..] = args else {
        bail!("usage: fireside chat <model> <prompt...>");
    };
    if prompt.is_empty() {
        bail!("usage: fireside chat <model> <prompt...>");
    }

    let api = StoryApi::new(config.story_api_url.clone());
    let response = api
        .generate_text(&ChatRequest {
            model: model.clone(),
            prompt: prompt.join(" "),
            format: "json".to_string(),
            stream: false,
        })
        .await?;
    println!("{response}");
    Ok(())
}

async fn run_translate(config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    let [from_code, to_code, sentence @ ..] = args else {
        bail!("usage: fireside translate <from> <to> <sentence...>");
    };
    if sentence.is_empty() {
        bail!("usage: fireside translate <from> <to> <sentence...>");
    }

    let api = SpeechApi::new(config.speech_api_url.clone());
    let translated = api
        .translate_text(&sentence.join(" "), from_code, to_code)
        .await?;
    println!("{translated}");
    Ok(())
}

async fn run_tts(config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    if args.is_empty() {
        bail!("usage: fireside tts <sentence...>");
    }

    let api = SpeechApi::new(config.speech_api_url.clone());
    let audio = api.text_to_speech(&args.join(" "), Some("en")).await?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;
    let path = config.output_dir.join("speech.mp3");
    std::fs::write(&path, audio).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "Speech written");
    Ok(())
}

async fn run_stt(config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    let [file] = args else {
        bail!("usage: fireside stt <file>");
    };

    let audio = std::fs::read(file).with_context(|| format!("failed to read {file}"))?;
    let filename = std::path::Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.ogg".to_string());
    let audio_type = std::path::Path::new(file)
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ogg".to_string());

    let api = SpeechApi::new(config.speech_api_url.clone());
    let text = api
        .speech_to_text(audio, &filename, &audio_type, None)
        .await?;
    println!("{text}");
    Ok(())
}

async fn run_models(config: &ClientConfig) -> anyhow::Result<()> {
    let api = StoryApi::new(config.story_api_url.clone());
    for model in api.list_models().await? {
        println!("{}\t{}\t{}", model.value, model.kind, model.description);
    }
    Ok(())
}
