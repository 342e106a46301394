use ripple_core::prelude::*;
use ripple_ui::*;

use super::ScreenContext;
use crate::destination::Destination;
use crate::view_models::SideEffectsViewModel;

fn section(ctx: &ScreenContext, title: &str, items: &[Destination]) -> Vec<View> {
    let mut views = vec![Text(title).size(18.0)];
    views.extend(items.iter().map(|&d| Button(d.label(), ctx.go(d))));
    views
}

pub fn screen(ctx: &ScreenContext) -> View {
    ctx.log_created();

    let vm = remember(SideEffectsViewModel::new);
    launched_effect((), {
        let lifecycle = ctx.lifecycle();
        let rx = vm.ui_state();
        move || async move {
            collect_with_lifecycle(lifecycle, rx, |state| {
                log::debug!("home ui state: {state:?}");
            })
            .await;
        }
    });

    Column(Modifier::new().fill_max_size().center_children().gap(4.0)).child((
        Text(ctx.name()).size(22.0),
        section(
            ctx,
            "Suspended Effect Handler",
            &[Destination::LaunchedEffect, Destination::RememberCoroutineScope],
        ),
        Divider().modifier(Modifier::new().padding_vertical(8.0)),
        section(
            ctx,
            "Non Suspended Effect Handler",
            &[Destination::SideEffect, Destination::DisposableEffect],
        ),
        Divider().modifier(Modifier::new().padding_vertical(8.0)),
        section(
            ctx,
            "Side-Effect States",
            &[
                Destination::RememberUpdatedState,
                Destination::ProduceState,
                Destination::DerivedStateOf,
                Destination::SnapshotFlow,
            ],
        ),
        Divider().modifier(Modifier::new().padding_vertical(8.0)),
        section(ctx, "Practice", &[Destination::Practicals]),
    ))
}
