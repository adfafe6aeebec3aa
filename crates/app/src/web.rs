use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use resume_screen_core::{format_score, join_skills, ResumeResult, ResumeScreener, ScreenError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub screener: Arc<ResumeScreener>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_form).post(handle_rank))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Errors surfaced to the person using the form. Messages never carry
/// temporary workspace paths.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Screening(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WebError {
    fn from_screening(error: ScreenError, workspace: &Path) -> Self {
        let message = redact_workspace(&error.to_string(), workspace);
        if error.is_input_error() {
            WebError::BadRequest(message)
        } else {
            WebError::Screening(message)
        }
    }
}

impl From<MultipartError> for WebError {
    fn from(error: MultipartError) -> Self {
        WebError::BadRequest(error.body_text())
    }
}

impl From<std::io::Error> for WebError {
    fn from(error: std::io::Error) -> Self {
        WebError::Internal(error.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::BadRequest(message) => {
                warn!(%message, "rejected upload");
                StatusCode::BAD_REQUEST
            }
            WebError::Screening(message) => {
                error!(%message, "screening failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WebError::Internal(message) => {
                error!(%message, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let shown = match &self {
            WebError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        (status, Html(render_page(None, Some(&shown)))).into_response()
    }
}

async fn handle_form() -> Html<String> {
    Html(render_page(None, None))
}

async fn handle_rank(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, WebError> {
    // Dropping the TempDir removes every upload, on success or error.
    let workspace = tempfile::Builder::new()
        .prefix("resume-screen-")
        .tempdir()?;
    let jd_dir = workspace.path().join("jd");
    let resumes_dir = workspace.path().join("resumes");
    tokio::fs::create_dir_all(&jd_dir).await?;
    tokio::fs::create_dir_all(&resumes_dir).await?;

    let mut jd_path = None;
    let mut resume_count = 0usize;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        let Some(file_name) = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .map(sanitize_file_name)
        else {
            continue;
        };
        let data = field.bytes().await?;

        match field_name.as_str() {
            "jd" => {
                let path = jd_dir.join(&file_name);
                tokio::fs::write(&path, &data).await?;
                jd_path = Some(path);
            }
            "resumes" => {
                let path = unique_path(&resumes_dir, &file_name);
                tokio::fs::write(&path, &data).await?;
                resume_count += 1;
            }
            other => warn!(field = other, "ignoring unexpected upload field"),
        }
    }

    let jd_path = jd_path
        .ok_or_else(|| WebError::BadRequest("a job description file is required".to_string()))?;
    if resume_count == 0 {
        return Err(WebError::BadRequest(
            "at least one resume file is required".to_string(),
        ));
    }

    info!(resumes = resume_count, "ranking uploaded resumes");

    let screener = Arc::clone(&state.screener);
    let folder = resumes_dir.clone();
    let results = tokio::task::spawn_blocking(move || screener.rank_folder(&jd_path, &folder))
        .await
        .map_err(|error| WebError::Internal(error.to_string()))?
        .map_err(|error| WebError::from_screening(error, workspace.path()))?;

    let rows = results
        .into_iter()
        .map(|result| display_relative(result, &resumes_dir))
        .collect::<Vec<_>>();

    Ok(Html(render_page(Some(&rows), None)))
}

fn display_relative(mut result: ResumeResult, root: &Path) -> ResumeResult {
    if let Ok(relative) = Path::new(&result.resume_path).strip_prefix(root) {
        result.resume_path = relative.display().to_string();
    }
    result
}

fn redact_workspace(message: &str, workspace: &Path) -> String {
    let root = workspace.display().to_string();
    message
        .replace(&format!("{root}{}", std::path::MAIN_SEPARATOR), "")
        .replace(&root, "")
}

/// Reduces an uploaded name to a bare file name of `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    let cleaned = cleaned.trim_start_matches('.').trim_matches('_').to_string();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

fn unique_path(folder: &Path, file_name: &str) -> PathBuf {
    let candidate = folder.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let mut counter = 2usize;
    loop {
        let candidate = folder.join(format!("{counter}-{file_name}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_page(results: Option<&[ResumeResult]>, error: Option<&str>) -> String {
    let mut body = String::from(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Resume Screening</title>
</head>
<body>
  <h2>Resume Screening</h2>
  <form method="POST" enctype="multipart/form-data">
    <p><label>Job description: <input type="file" name="jd" required></label></p>
    <p><label>Resumes: <input type="file" name="resumes" multiple required></label></p>
    <button type="submit">Rank resumes</button>
  </form>
"#,
    );

    if let Some(message) = error {
        body.push_str(&format!(
            "  <p class=\"error\" role=\"alert\">{}</p>\n",
            escape_html(message)
        ));
    }

    if let Some(results) = results {
        body.push_str(
            "  <h3>Results</h3>\n  <table>\n    <thead><tr><th>#</th><th>Filename</th><th>Final Score</th>\
             <th>Similarity</th><th>Skills Match</th><th>Matched Skills</th></tr></thead>\n    <tbody>\n",
        );
        for (index, result) in results.iter().enumerate() {
            body.push_str(&format!(
                "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                index + 1,
                escape_html(&result.resume_path),
                format_score(result.final_score),
                format_score(result.similarity_score),
                format_score(result.skills_score),
                escape_html(&join_skills(&result.skills_matched)),
            ));
        }
        body.push_str("    </tbody>\n  </table>\n");
    }

    body.push_str("</body>\n</html>\n");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use resume_screen_core::{ScreeningOptions, SkillsDictionary};
    use tower::ServiceExt;

    const BOUNDARY: &str = "screening-test-boundary";

    fn app() -> Router {
        let dictionary = SkillsDictionary::new([("languages", vec!["python", "sql"])]);
        let screener = ResumeScreener::new(dictionary, ScreeningOptions::default()).unwrap();
        build_router(AppState {
            screener: Arc::new(screener),
        })
    }

    fn multipart_body(files: &[(&str, &str, &str)]) -> Body {
        let mut body = String::new();
        for (field, file_name, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: text/plain\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    fn upload(files: &[(&str, &str, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart_body(files))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\My CV.docx"), "My_CV.docx");
        assert_eq!(sanitize_file_name(".hidden.txt"), "hidden.txt");
        assert_eq!(sanitize_file_name("<>"), "upload");
    }

    #[test]
    fn workspace_paths_are_redacted() {
        let workspace = Path::new("/tmp/resume-screen-abc");
        let message = "unsupported file type '.html': /tmp/resume-screen-abc/jd/jd.html";
        assert_eq!(
            redact_workspace(message, workspace),
            "unsupported file type '.html': jd/jd.html"
        );
    }

    #[tokio::test]
    async fn form_is_served() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("name=\"resumes\""));
    }

    #[tokio::test]
    async fn uploads_are_ranked() {
        let response = app()
            .oneshot(upload(&[
                ("jd", "jd.txt", "Looking for a Python developer with SQL experience"),
                ("resumes", "bob.txt", "Experienced woodworking carpenter"),
                ("resumes", "alice.txt", "Experienced Python and SQL developer"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        let alice = page.find("<td>alice.txt</td>").expect("alice row");
        let bob = page.find("<td>bob.txt</td>").expect("bob row");
        assert!(alice < bob);
        assert!(page.contains("<td>python, sql</td>"));
        assert!(!page.contains("resume-screen-"));
    }

    #[tokio::test]
    async fn unsupported_job_description_is_a_bad_request() {
        let response = app()
            .oneshot(upload(&[
                ("jd", "jd.html", "<p>Python</p>"),
                ("resumes", "alice.txt", "Python"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let page = body_text(response).await;
        assert!(page.contains("unsupported file type"));
        assert!(!page.contains("resume-screen-"));
    }

    #[tokio::test]
    async fn missing_resumes_are_rejected() {
        let response = app()
            .oneshot(upload(&[("jd", "jd.txt", "Python")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
