use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chat_sentiment::{
    server, BuiltinModel, LexiconModel, ModelManager, OnnxSentimentModel, RuntimeConfig,
    SentimentAnalyzer, ServerConfig,
};
use clap::Parser;
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = chat_sentiment::config::DEFAULT_PORT)]
    port: u16,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = chat_sentiment::config::DEFAULT_HOST)]
    host: String,

    /// Root directory of the model cache
    #[arg(long, env = "CHAT_SENTIMENT_CACHE")]
    model_dir: Option<PathBuf>,

    /// Force a fresh download of the model files
    #[arg(short, long)]
    fresh: bool,

    /// Serve the offline keyword model instead of the ONNX model
    #[arg(long)]
    lexicon: bool,

    /// ONNX Runtime intra-op threads (0 lets the runtime decide)
    #[arg(long, default_value_t = 0)]
    intra_threads: usize,
}

async fn load_onnx_model(args: &Args) -> Result<OnnxSentimentModel> {
    let manager = match &args.model_dir {
        Some(dir) => ModelManager::new(dir.join("models")),
        None => ModelManager::new_default(),
    }
    .context("Failed to prepare model cache directory")?;

    let model = BuiltinModel::XlmRobertaSentiment;
    let info = model.get_model_info();

    if args.fresh {
        info!("Fresh download requested - removing any existing model files...");
        manager.remove_download(&info.name)?;
    }
    manager
        .ensure_model_downloaded(&info)
        .await
        .with_context(|| format!("Failed to download model '{}'", info.name))?;

    let start = Instant::now();
    let onnx = OnnxSentimentModel::builder()
        .with_runtime_config(RuntimeConfig::default().with_intra_threads(args.intra_threads))
        .with_model_manager(manager)
        .with_model(model)?
        .build()
        .context("Failed to load sentiment model")?;
    info!("Model loaded in {:.2?}", start.elapsed());
    Ok(onnx)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let analyzer = if args.lexicon {
        info!("Using the keyword lexicon model");
        SentimentAnalyzer::new(LexiconModel::new())
    } else {
        SentimentAnalyzer::new(load_onnx_model(&args).await?)
    };

    let config = ServerConfig::new(args.host.clone(), args.port);
    let addr = config.socket_addr()?;
    info!("=== Chat Sentiment Analysis API ({}) ===", analyzer.model_name());

    server::serve(addr, analyzer)
        .await
        .with_context(|| format!("Server on {} failed", addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_bind_defaults_come_from_config() {
        let command = Args::command();
        let default_of = |id: &str| {
            command.get_arguments()
                .find(|arg| arg.get_id() == id)
                .map(|arg| arg.get_default_values()
                    .iter()
                    .map(|value| value.to_string_lossy().into_owned())
                    .collect::<Vec<_>>())
                .unwrap()
        };
        assert_eq!(default_of("host"), vec![chat_sentiment::config::DEFAULT_HOST.to_string()]);
        assert_eq!(default_of("port"), vec![chat_sentiment::config::DEFAULT_PORT.to_string()]);
    }
}
