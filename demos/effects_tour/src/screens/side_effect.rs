//! Side effects run after every successful frame of the group that declared
//! them, never during composition. The counter nests three groups so a click
//! only re-runs the innermost one.

use ripple_core::prelude::*;
use ripple_ui::*;

use super::{ScreenContext, toggle};

pub fn screen(ctx: &ScreenContext) -> View {
    ctx.log_created();

    let refresh = remember(|| signal(false));
    let state = remember(|| signal(1001));

    let content = {
        let ctx = ctx.clone();
        let state = state.get();
        key(refresh.get(), move || {
            let text = value(&ctx, state);
            ctx.log(format!("3. Statement: {text}"));
            Column(Modifier::new().center_children()).child((
                Text(text),
                counter(&ctx, state),
                initialize_value(&ctx, state),
            ))
        })
    };

    Column(Modifier::new().fill_max_size().center_children()).child((
        Text(ctx.name()),
        Button("Update State", {
            let state = (*state).clone();
            move || state.update(|v| *v += 123)
        }),
        Button("Refresh", toggle(&refresh)),
        content,
    ))
}

fn value(ctx: &ScreenContext, state: i32) -> String {
    ctx.log(format!("State: {state}"));
    let text = "Text".to_string();
    side_effect({
        let ctx = ctx.clone();
        let text = text.clone();
        move || ctx.log(format!("1. Statement: {text}"))
    });
    ctx.log(format!("2. Statement: {text}"));
    text
}

fn counter(ctx: &ScreenContext, state: i32) -> View {
    let ctx = ctx.clone();
    group(move || {
        ctx.log(format!("State: {state}"));
        let count = remember(|| signal(0));

        side_effect({
            let ctx = ctx.clone();
            move || ctx.log("1. Statement-1")
        });
        ctx.log("2. Statement-2");

        let ctx = ctx.clone();
        let count = (*count).clone();
        group(move || {
            side_effect({
                let ctx = ctx.clone();
                move || ctx.log("3. Statement-3")
            });
            ctx.log("4. Statement-4");

            let ctx = ctx.clone();
            let count = count.clone();
            Column(Modifier::new()).child(group(move || {
                side_effect({
                    let ctx = ctx.clone();
                    move || ctx.log("5. Statement-5")
                });
                ctx.log("6. Statement-6");
                let c = count.clone();
                Button(format!("{}++", count.get()), move || c.update(|n| *n += 1))
            }))
        })
    })
}

/// One-time initialization through a side effect: the flag flips after the
/// first frame, which schedules one more frame of this group.
fn initialize_value(ctx: &ScreenContext, state: i32) -> View {
    let ctx = ctx.clone();
    group(move || {
        ctx.log(format!("State: {state}"));
        let initialized = remember(|| signal(false));
        ctx.log(format!("1. Is Initialized: {}", initialized.get()));

        side_effect({
            let ctx = ctx.clone();
            let initialized = (*initialized).clone();
            move || {
                if !initialized.get_untracked() {
                    initialized.set(true);
                }
                ctx.log(format!("2. Is Initialized: {}", initialized.get_untracked()));
            }
        });

        Text(format!("Is Initialized: {}", initialized.get()))
    })
}
