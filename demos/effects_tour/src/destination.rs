use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Every screen of the tour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Home,
    Practicals,
    SideEffect,
    LaunchedEffect,
    DisposableEffect,
    ProduceState,
    DerivedStateOf,
    SnapshotFlow,
    RememberCoroutineScope,
    RememberUpdatedState,
}

impl Destination {
    pub const ALL: [Destination; 10] = [
        Destination::Home,
        Destination::Practicals,
        Destination::SideEffect,
        Destination::LaunchedEffect,
        Destination::DisposableEffect,
        Destination::ProduceState,
        Destination::DerivedStateOf,
        Destination::SnapshotFlow,
        Destination::RememberCoroutineScope,
        Destination::RememberUpdatedState,
    ];

    /// Screen title; also the prefix of the screen's log lines.
    pub fn title(self) -> &'static str {
        match self {
            Destination::Home => "Effect-Handlers and Side-Effect States",
            Destination::Practicals => "Practice Fragment",
            Destination::SideEffect => "Practical 1: SideEffect",
            Destination::LaunchedEffect => "LaunchedEffect",
            Destination::DisposableEffect => "Practical 3: DisposableEffect",
            Destination::ProduceState => "ProduceState",
            Destination::DerivedStateOf => "Practical 5: DerivedStateOf",
            Destination::SnapshotFlow => "Snapshot Flow",
            Destination::RememberCoroutineScope => "Practical 7: RememberCoroutineScope",
            Destination::RememberUpdatedState => "Practical 8: RememberUpdatedState",
        }
    }

    /// Label of the menu button leading here.
    pub fn label(self) -> &'static str {
        match self {
            Destination::Home => "Home",
            Destination::Practicals => "Practicals",
            Destination::SideEffect => "Side Effect",
            Destination::LaunchedEffect => "Launched Effect",
            Destination::DisposableEffect => "Disposable Effect",
            Destination::ProduceState => "Produce State",
            Destination::DerivedStateOf => "Derived State Of",
            Destination::SnapshotFlow => "Snapshot Flow",
            Destination::RememberCoroutineScope => "Remember Coroutine Scope",
            Destination::RememberUpdatedState => "Remember Updated State",
        }
    }
}
