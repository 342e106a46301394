use ripple_core::prelude::*;
use ripple_ui::*;

use super::{ScreenContext, practice_screen};

pub fn screen(ctx: &ScreenContext) -> View {
    practice_screen(ctx, Some("Update LaunchedEffect Key"), counter)
}

/// Ticks once per `tick_ms` for as long as `key` stays the same. A new key
/// restarts the loop from zero; the displayed count survives the restart.
fn counter(ctx: &ScreenContext, key: bool, state: i32) -> View {
    ctx.log(format!("State: {state}"));

    let count = remember(|| signal(0));
    launched_effect(key, {
        let ctx = ctx.clone();
        let count = (*count).clone();
        let tick = ctx.config().tick();
        move || async move {
            ctx.log(format!("LaunchedEffectKey: {key}"));
            let mut i = 0;
            loop {
                tokio::time::sleep(tick).await;
                ctx.log(format!("Tick: {i}"));
                i += 1;
                count.set(i);
            }
        }
    });

    Column(Modifier::new().center_children()).child((
        Text(format!("LaunchedEffectKey: {key}")),
        Text(format!("State: {state}")),
        Text(format!("Count: {}", count.get())),
    ))
}
