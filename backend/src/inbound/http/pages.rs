//! Browser-facing pages: the upload UI and its static assets.
//!
//! Static files are opened through a `cap_std::fs::Dir` rooted at the
//! configured directory, so names and symlinks cannot reach outside it.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use actix_files::NamedFile;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, web};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use crate::domain::Error;
use crate::inbound::http::ApiResult;

const INDEX_HTML: &str = include_str!("../../../templates/index.html");

/// Directory `GET /static/{file}` serves from.
#[derive(Debug, Clone)]
pub struct StaticDir(PathBuf);

impl StaticDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Open the regular file `name` inside the directory.
    fn open(&self, name: &str) -> io::Result<std::fs::File> {
        let dir = Dir::open_ambient_dir(&self.0, ambient_authority())?;
        let file = dir.open(name)?;
        if !file.metadata()?.is_file() {
            return Err(io::Error::new(ErrorKind::NotFound, "not a regular file"));
        }
        Ok(file.into_std())
    }
}

/// Hidden files are never served.
fn is_public_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.')
}

/// Render the upload UI.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Upload page", content_type = "text/html")),
    tags = ["pages"]
)]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

/// Serve a file from the static directory.
#[utoipa::path(
    get,
    path = "/static/{file}",
    params(("file" = String, Path, description = "Plain file name")),
    responses(
        (status = 200, description = "File contents"),
        (status = 404, description = "No such file", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["pages"]
)]
pub async fn static_file(
    dir: web::Data<StaticDir>,
    file: web::Path<String>,
) -> ApiResult<NamedFile> {
    let name = file.into_inner();
    let not_found = || Error::not_found("File not found");
    if !is_public_name(&name) {
        debug!(file = %name, "static file name rejected");
        return Err(not_found());
    }

    let path = dir.path().join(&name);
    let opened = {
        let dir = dir.clone();
        let name = name.clone();
        web::block(move || dir.open(&name)).await
    };
    let file = match opened {
        Ok(Ok(file)) => file,
        Ok(Err(err)) => {
            debug!(file = %name, error = %err, "static file could not be opened");
            return Err(not_found());
        }
        Err(err) => return Err(Error::internal(format!("static file task failed: {err}"))),
    };

    NamedFile::from_file(file, &path).map_err(|err| {
        debug!(file = %name, error = %err, "static file could not be served");
        not_found()
    })
}
