use ripple_core::prelude::*;
use ripple_ui::*;

use super::{ScreenContext, practice_screen};

pub fn screen(ctx: &ScreenContext) -> View {
    practice_screen(ctx, None, counter)
}

fn counter(ctx: &ScreenContext, _key: bool, state: i32) -> View {
    ctx.log(format!("State: {state}"));

    let count = produce_state(0, {
        let ctx = ctx.clone();
        let tick = ctx.config().tick();
        move |scope: ProduceStateScope<i32>| async move {
            let mut i = 0;
            loop {
                tokio::time::sleep(tick).await;
                ctx.log(format!("Tick: {i}"));
                i += 1;
                scope.set_value(i);
            }
        }
    });

    Column(Modifier::new().center_children()).child((
        Text(format!("State: {state}")),
        Text(format!("Count: {}", count.get())),
    ))
}
