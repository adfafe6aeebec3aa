mod web;

use chrono::Utc;
use clap::{Parser, Subcommand};
use resume_screen_core::{
    write_report_file, ResumeResult, ResumeScreener, ScreeningOptions, SkillsDictionary,
    DEFAULT_SIMILARITY_WEIGHT, DEFAULT_SKILLS_WEIGHT,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "resume-screen", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Skills dictionary YAML (category -> list of phrases). Uses the built-in
    /// dictionary when omitted.
    #[arg(long, global = true, env = "RESUME_SCREEN_SKILLS")]
    skills: Option<PathBuf>,

    /// Weight of TF-IDF similarity in the final score.
    #[arg(long, global = true, env = "RESUME_SCREEN_SIMILARITY_WEIGHT", default_value_t = DEFAULT_SIMILARITY_WEIGHT)]
    similarity_weight: f64,

    /// Weight of skills coverage in the final score.
    #[arg(long, global = true, env = "RESUME_SCREEN_SKILLS_WEIGHT", default_value_t = DEFAULT_SKILLS_WEIGHT)]
    skills_weight: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Rank a folder of resumes against a job description and write a CSV report.
    Rank {
        /// Job description file (.txt, .pdf or .docx).
        #[arg(long)]
        jd: PathBuf,
        /// Folder searched recursively for resumes.
        #[arg(long)]
        resumes: PathBuf,
        /// Output CSV path.
        #[arg(long, default_value = "results.csv")]
        out: PathBuf,
    },
    /// Serve an upload form that ranks resumes per request.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "RESUME_SCREEN_ADDR", default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "resume-screen boot"
    );

    let dictionary = match &cli.skills {
        Some(path) => SkillsDictionary::from_path(path)?,
        None => SkillsDictionary::builtin()?,
    };
    let options = ScreeningOptions {
        similarity_weight: cli.similarity_weight,
        skills_weight: cli.skills_weight,
    };
    let screener = ResumeScreener::new(dictionary, options)?;

    match cli.command {
        Command::Rank { jd, resumes, out } => {
            let summary = run_rank(&screener, &jd, &resumes, &out)?;
            print!("{summary}");
        }
        Command::Serve { addr } => {
            let state = web::AppState {
                screener: Arc::new(screener),
            };
            let app = web::build_router(state).layer(TraceLayer::new_for_http());

            info!(%addr, "listening");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

/// Ranks a folder, writes the CSV report and returns the operator summary.
fn run_rank(
    screener: &ResumeScreener,
    jd: &Path,
    resumes: &Path,
    out: &Path,
) -> anyhow::Result<String> {
    let results = screener.rank_folder(jd, resumes)?;
    write_report_file(out, &results)?;
    Ok(format!("Wrote: {}\n{}", out.display(), render_summary(&results)))
}

fn render_summary(results: &[ResumeResult]) -> String {
    let mut summary = String::new();
    for (index, result) in results.iter().enumerate() {
        let name = Path::new(&result.resume_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| result.resume_path.clone());
        summary.push_str(&format!(
            "{:2}. {:40}  final={:.4}  sim={:.4}  skills={:.4}\n",
            index + 1,
            name,
            result.final_score,
            result.similarity_score,
            result.skills_score
        ));
    }
    summary
}
