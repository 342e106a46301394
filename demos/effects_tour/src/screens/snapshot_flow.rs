use futures::StreamExt;
use ripple_core::prelude::*;
use ripple_ui::*;

use super::{ScreenContext, practice_screen};

pub fn screen(ctx: &ScreenContext) -> View {
    practice_screen(ctx, Some("Update LaunchedEffect Key"), counter)
}

/// The effect turns the click count into a stream of distinct values and
/// reports each one. A new key starts a new stream, which replays the
/// current count first.
fn counter(ctx: &ScreenContext, key: bool, state: i32) -> View {
    ctx.log(format!("State: {state}"));

    let count = remember(|| signal(1));
    launched_effect(key, {
        let ctx = ctx.clone();
        let count = (*count).clone();
        move || async move {
            let mut flow = snapshot_flow(move || count.get()).map(|n| format!("Flow: {n}"));
            while let Some(message) = flow.next().await {
                ctx.log(&message);
                ctx.toast(message, Color::RED, std::time::Duration::ZERO);
            }
        }
    });

    let button = {
        let count = (*count).clone();
        group(move || {
            let c = count.clone();
            Button(format!("{}++", count.get()), move || c.update(|n| *n += 1))
        })
    };

    Column(Modifier::new().center_children()).child((Text(format!("State: {state}")), button))
}
