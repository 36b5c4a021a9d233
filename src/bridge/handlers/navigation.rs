// SPDX-License-Identifier: MPL-2.0
//! `navigation:get-tool` and `navigation:set-tool`.

use crate::bridge::context::BridgeContext;
use crate::bridge::envelope::now_millis;
use crate::domain::navigation::{NavigationState, ToolType};

pub(super) fn get_tool(ctx: &BridgeContext) -> NavigationState {
    ctx.navigation()
}

pub(super) fn set_tool(ctx: &BridgeContext, tool: ToolType) {
    ctx.select_tool(tool, now_millis());
    log::debug!("Active tool is now {tool}");
}
