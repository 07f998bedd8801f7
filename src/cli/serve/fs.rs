//! Static files from the serve root.

use super::path::{RequestPath, stat};
use super::response::Reply;
use crate::utils::mime;
use anyhow::Result;
use std::fs::File;
use std::path::Path;

/// Serve whatever is at `local` for `path`.
///
/// Files stream with their MIME type and directories serve their
/// `index.html`. A request naming `.../index.html` directly is redirected
/// to the directory.
pub fn serve(reply: Reply, path: &RequestPath, local: &Path) -> Result<()> {
    let meta = match stat(local) {
        Ok(Some(meta)) => meta,
        Ok(None) => return reply.not_found(),
        Err(e) => return reply.error(500, e),
    };

    if meta.is_dir() {
        let index = local.join("index.html");
        return match stat(&index) {
            Ok(Some(meta)) if meta.is_file() => serve_file(reply, &index),
            Ok(_) => reply.not_found(),
            Err(e) => reply.error(500, e),
        };
    }

    if let Some(dir) = path.without_index() {
        return reply.redirect(301, &dir);
    }
    serve_file(reply, local)
}

/// Stream a single file with the MIME type of its extension.
pub fn serve_file(reply: Reply, local: &Path) -> Result<()> {
    let file = match File::open(local) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return reply.not_found(),
        Err(e) => return reply.error(500, e),
    };
    reply.file(file, mime::from_path(local), false)
}
