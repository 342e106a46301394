use ripple_core::prelude::*;
use ripple_ui::*;

use super::ScreenContext;
use crate::destination::Destination;

const PRACTICALS: [Destination; 7] = [
    Destination::SideEffect,
    Destination::LaunchedEffect,
    Destination::DisposableEffect,
    Destination::ProduceState,
    Destination::DerivedStateOf,
    Destination::SnapshotFlow,
    Destination::RememberCoroutineScope,
];

pub fn screen(ctx: &ScreenContext) -> View {
    ctx.log_created();

    let buttons: Vec<View> = PRACTICALS
        .iter()
        .map(|&d| Button(d.label(), ctx.go(d)))
        .collect();
    Column(Modifier::new().fill_max_size().center_children().gap(4.0)).child(buttons)
}
