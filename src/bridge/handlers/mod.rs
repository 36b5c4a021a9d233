// SPDX-License-Identifier: MPL-2.0
//! Per-channel handlers.
//!
//! Handlers only ever see validated requests. Each returns its typed response,
//! serialized here into the envelope's `data`.

mod dialog;
pub(crate) mod files;
mod image;
mod navigation;
mod video;
mod window;
mod youtube;

use serde::Serialize;
use serde_json::Value;

use super::context::BridgeContext;
use super::error::BridgeError;
use super::payload::{CallRequest, SignalRequest};

fn to_data<T: Serialize>(value: &T) -> Result<Value, BridgeError> {
    serde_json::to_value(value)
        .map_err(|err| BridgeError::internal(format!("failed to encode response: {err}")))
}

/// Runs a call-channel request to completion.
pub(crate) async fn call(ctx: &BridgeContext, request: CallRequest) -> Result<Value, BridgeError> {
    match request {
        CallRequest::DialogOpen(payload) => to_data(&dialog::open(ctx, payload).await?),
        CallRequest::WindowGetState => to_data(&window::get_state(ctx)?),
        CallRequest::FilesValidate { path } => to_data(&files::validate(path).await),
        CallRequest::FilesGetMetadata { path } => to_data(&files::get_metadata(ctx, path).await?),
        CallRequest::NavigationGetTool => to_data(&navigation::get_tool(ctx)),
        CallRequest::ImageGetMetadata { path } => to_data(&image::get_metadata(ctx, path).await?),
        CallRequest::ImageConvert { path, options } => {
            to_data(&image::convert(ctx, path, options).await?)
        }
        CallRequest::VideoConvert(request) => to_data(&video::convert(ctx, request).await?),
        CallRequest::YoutubeGetInfo { url } => to_data(&youtube::get_info(ctx, url).await?),
        CallRequest::YoutubeDownload(request) => to_data(&youtube::download(ctx, request).await?),
    }
}

/// Applies a signal. Signals are synchronous and have no reply.
pub(crate) fn signal(ctx: &BridgeContext, request: SignalRequest) -> Result<(), BridgeError> {
    match request {
        SignalRequest::WindowMinimize => window::minimize(ctx),
        SignalRequest::WindowMaximize => window::maximize(ctx),
        SignalRequest::WindowUnmaximize => window::unmaximize(ctx),
        SignalRequest::WindowClose => window::close(ctx),
        SignalRequest::NavigationSetTool(tool) => {
            navigation::set_tool(ctx, tool);
            Ok(())
        }
    }
}
