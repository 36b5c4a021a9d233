// SPDX-License-Identifier: MPL-2.0
//! `window:*` channels.

use crate::bridge::context::BridgeContext;
use crate::bridge::error::BridgeError;
use crate::bridge::response::WindowStateData;

pub(super) fn get_state(ctx: &BridgeContext) -> Result<WindowStateData, BridgeError> {
    Ok(WindowStateData {
        state: ctx.window().state()?,
    })
}

pub(super) fn minimize(ctx: &BridgeContext) -> Result<(), BridgeError> {
    Ok(ctx.window().minimize()?)
}

/// Toggles: a maximized window is restored.
pub(super) fn maximize(ctx: &BridgeContext) -> Result<(), BridgeError> {
    let window = ctx.window();
    if window.state()?.is_maximized {
        window.unmaximize()?;
    } else {
        window.maximize()?;
    }
    Ok(())
}

pub(super) fn unmaximize(ctx: &BridgeContext) -> Result<(), BridgeError> {
    Ok(ctx.window().unmaximize()?)
}

pub(super) fn close(ctx: &BridgeContext) -> Result<(), BridgeError> {
    Ok(ctx.window().close()?)
}
