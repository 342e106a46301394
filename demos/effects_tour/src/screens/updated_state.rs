use ripple_core::prelude::*;
use ripple_ui::*;

use super::{ScreenContext, practice_screen};

pub fn screen(ctx: &ScreenContext) -> View {
    practice_screen(ctx, None, counter)
}

fn counter(ctx: &ScreenContext, _key: bool, state: i32) -> View {
    let counter = remember(|| signal(0));
    launched_effect((), {
        let counter = (*counter).clone();
        let period = ctx.config().updated_state_tick();
        move || async move {
            loop {
                tokio::time::sleep(period).await;
                counter.update(|n| *n += 1);
            }
        }
    });
    counter_view(ctx, state, counter.get())
}

/// The effect is launched once, so the `counter` it captured stays at its
/// first value; the updated state always holds the latest one.
fn counter_view(ctx: &ScreenContext, state: i32, counter: i32) -> View {
    ctx.log(format!("State: {state}"));

    let latest = remember_updated_state(counter);
    launched_effect((), {
        let ctx = ctx.clone();
        let tick = ctx.config().tick();
        move || async move {
            loop {
                tokio::time::sleep(tick).await;
                ctx.toast(format!("Counter: {counter}"), Color::RED, std::time::Duration::ZERO);
                tokio::time::sleep(tick).await;
                ctx.toast(
                    format!("Counter (with rememberUpdatedState): {}", latest.get_untracked()),
                    Color::GREEN,
                    std::time::Duration::ZERO,
                );
            }
        }
    });

    Column(Modifier::new().center_children()).child((
        Text(format!("State: {state}")),
        Text(format!("Count: {counter}")),
    ))
}
