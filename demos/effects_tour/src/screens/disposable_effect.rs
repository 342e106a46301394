use ripple_core::prelude::*;
use ripple_ui::*;

use super::{ScreenContext, practice_screen};

pub fn screen(ctx: &ScreenContext) -> View {
    practice_screen(ctx, Some("Update LaunchedEffect Key"), counter)
}

/// The effect starts its own detached job; the cleanup cancels it, on key
/// change and when the counter leaves the composition.
fn counter(ctx: &ScreenContext, key: bool, state: i32) -> View {
    ctx.log(format!("State: {state}"));

    let count = remember(|| signal(0));
    disposable_effect(key, {
        let ctx = ctx.clone();
        let count = (*count).clone();
        move || {
            let scope = CoroutineScope::new();
            let tick = ctx.config().tick();
            let job = scope.launch({
                let ctx = ctx.clone();
                async move {
                    ctx.log(format!("DisposableEffectKey: {key}"));
                    let mut i = 0;
                    loop {
                        tokio::time::sleep(tick).await;
                        ctx.log(format!("Tick: {i}"));
                        i += 1;
                        count.set(i);
                    }
                }
            });

            on_unmount(move || {
                ctx.log("onDispose()");
                job.cancel();
            })
        }
    });

    Column(Modifier::new().center_children()).child((
        Text(format!("DisposableEffectKey: {key}")),
        Text(format!("State: {state}")),
        Text(format!("Count: {}", count.get())),
    ))
}
