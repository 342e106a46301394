use ripple_core::prelude::*;
use ripple_ui::*;

use super::{ScreenContext, practice_screen};

pub fn screen(ctx: &ScreenContext) -> View {
    practice_screen(ctx, None, counter)
}

/// Every click recomputes the derived flag, but the counter's group only
/// re-runs when the flag flips. The click count itself is read by the
/// button's own group.
fn counter(ctx: &ScreenContext, _key: bool, state: i32) -> View {
    ctx.log(format!("State: {state}"));

    let count = remember(|| signal(1));
    let is_multiple_of_5 = derived_state_of({
        let ctx = ctx.clone();
        let count = (*count).clone();
        move || {
            let message = format!("Count In DerivedState: {}", count.get());
            ctx.log(&message);
            ctx.toast(message, Color::RED, std::time::Duration::ZERO);
            count.get() % 5 == 0
        }
    });

    let message = format!(
        "Is count in multiple of 5? {}",
        if is_multiple_of_5.get() { "Yes" } else { "No" }
    );
    ctx.log(&message);
    ctx.toast(message.clone(), Color::GREEN, ctx.config().toast_delay());

    let button = {
        let count = (*count).clone();
        group(move || {
            let c = count.clone();
            Button(format!("{}++", count.get()), move || c.update(|n| *n += 1))
        })
    };

    Column(Modifier::new().center_children()).child((
        Text(format!("State: {state}")),
        button,
        Text(message),
    ))
}
