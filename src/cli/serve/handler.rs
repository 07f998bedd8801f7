//! Per-request dispatch.

use super::ServerState;
use super::fs;
use super::path::{RequestPath, stat};
use super::response::Reply;
use super::route::{INDEX, Route};
use crate::build::BuildOutcome;
use crate::debug;
use crate::embed::serve::{INDEX_HTML, RenderContext};
use crate::reload::WaitOutcome;
use crate::utils::mime::types::WASM;
use anyhow::Result;
use tiny_http::Request;

/// Handle a single HTTP request.
pub fn handle_request(request: Request, state: &ServerState) -> Result<()> {
    let reply = Reply::new(request, state.config.serve.allow_origin.as_deref());
    debug!("serve"; "{} {}", reply.method(), reply.url());

    let outdir = match state.builder.output_dir() {
        Ok(dir) => dir,
        Err(e) => return reply.error(500, chain(e)),
    };

    let path = RequestPath::parse(reply.url());
    if !path.is_safe() {
        return reply.not_found();
    }
    let local = path.local(state.config.root());

    if !path.ends_with_slash() {
        match stat(&local) {
            Ok(Some(meta)) if meta.is_dir() => {
                return reply.redirect(303, &path.with_trailing_slash());
            }
            Ok(_) => {}
            Err(e) => return reply.error(500, e),
        }
    }

    let artifact = state.config.artifact_name();
    let route = Route::classify(path.final_segment(), artifact);

    if route.disk_first() {
        let candidate = match path.final_segment() {
            "" | "." => local.join(INDEX),
            _ => local.clone(),
        };
        match stat(&candidate) {
            Ok(Some(_)) => return fs::serve(reply, &path, &local),
            Ok(None) => {}
            Err(e) => return reply.error(500, e),
        }
    }

    match route {
        Route::Index => {
            let argv = if state.config.args.is_empty() {
                vec![outdir.join(artifact).to_string_lossy().into_owned()]
            } else {
                state.config.args.clone()
            };
            let ctx = RenderContext::new(artifact, argv, RenderContext::process_env());
            reply.html(INDEX_HTML.render(&ctx))
        }
        Route::RuntimeShim => match state.builder.toolchain().wasm_exec_js() {
            Ok(shim) => fs::serve_file(reply, &shim),
            Err(e) => reply.error(500, chain(e)),
        },
        Route::Artifact => match state.builder.build(&state.config.build_target()) {
            Ok(BuildOutcome::Success { file, .. }) => reply.file(file, WASM, true),
            Ok(BuildOutcome::Failure { diagnostics }) => reply.error(500, diagnostics),
            Err(e) => reply.error(500, chain(e)),
        },
        Route::Wait => match state.reload.wait() {
            WaitOutcome::Notified => reply.empty(),
            WaitOutcome::Cancelled => reply.error(503, "server shutting down"),
        },
        Route::Notify => {
            let released = state.reload.notify();
            debug!("reload"; "released {released} waiter(s)");
            reply.empty()
        }
        Route::Static => fs::serve(reply, &path, &local),
    }
}

/// Error text including its causes.
fn chain(e: impl Into<anyhow::Error>) -> String {
    format!("{:#}", e.into())
}
