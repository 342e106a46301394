use std::time::Duration;

use ripple_core::prelude::*;
use ripple_ui::*;

use super::{ScreenContext, practice_screen};

/// Reported when the counter leaves the composition mid-run.
pub const CANCELLED_MESSAGE: &str = "The coroutine scope left the composition";

pub fn screen(ctx: &ScreenContext) -> View {
    practice_screen(ctx, None, counter)
}

/// A click starts a finite job on the remembered scope. The button stays
/// disabled while the job runs; removing the counter cancels the job.
fn counter(ctx: &ScreenContext, _key: bool, state: i32) -> View {
    ctx.log(format!("State: {state}"));

    let count = remember(|| signal(0u32));
    let is_enabled = remember(|| signal(true));
    let scope = remember_coroutine_scope();

    let on_click = {
        let ctx = ctx.clone();
        let count = (*count).clone();
        let is_enabled = (*is_enabled).clone();
        move || {
            is_enabled.set(false);
            let ctx = ctx.clone();
            let count = count.clone();
            let is_enabled = is_enabled.clone();
            scope.launch(async move {
                let target = ctx.config().counter_target;
                let tick = ctx.config().tick();
                count.set(0);
                let guard = on_cancel({
                    let ctx = ctx.clone();
                    move || {
                        ctx.log(format!("Error: {CANCELLED_MESSAGE}"));
                        ctx.toast(format!("Error: {CANCELLED_MESSAGE}"), Color::RED, Duration::ZERO);
                    }
                });
                while count.get_untracked() < target {
                    tokio::time::sleep(tick).await;
                    count.update(|n| *n += 1);
                    ctx.log(format!("Tick: {}", count.get_untracked()));
                }
                guard.complete();
                ctx.toast("Counter finished!!", Color::GREEN, Duration::ZERO);
                is_enabled.set(true);
            });
        }
    };

    Column(Modifier::new().center_children()).child((
        Text(format!("State: {state}")),
        Button("Start 5sec Counter", on_click).enabled(is_enabled.get()),
        Text(format!("Count: {}", count.get())),
    ))
}
