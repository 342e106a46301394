#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    use futures::{FutureExt, StreamExt};
    use tokio::sync::watch;
    use tokio::task::LocalSet;
    use tokio::time::sleep;

    use crate::runtime::live_groups;
    use crate::*;

    fn text(s: impl Into<String>) -> View {
        View::new(
            0,
            ViewKind::Text {
                text: s.into(),
                color: Color::BLACK,
                font_size: 14.0,
            },
        )
    }

    fn button(label: &str, enabled: bool, on_click: impl Fn() + 'static) -> View {
        View::new(
            0,
            ViewKind::Button {
                text: label.into(),
                on_click: Some(Rc::new(on_click)),
                enabled,
            },
        )
        .semantics(Semantics {
            role: Role::Button,
            label: Some(label.into()),
            enabled,
        })
    }

    fn column(children: Vec<View>) -> View {
        View::new(0, ViewKind::Column).with_children(children)
    }

    /// Layout stand-in: one hit region per button, no geometry.
    fn flat(root: &View, _size: (u32, u32)) -> (Vec<HitRegion>, Vec<SemNode>) {
        let mut hits = Vec::new();
        let mut sems = Vec::new();
        let mut next = 0u64;
        root.walk(&mut |v| {
            next += 1;
            if let ViewKind::Button {
                on_click, enabled, ..
            } = &v.kind
            {
                hits.push(HitRegion {
                    id: next,
                    rect: Rect::default(),
                    on_click: on_click.clone(),
                    enabled: *enabled,
                });
            }
            if let Some(s) = &v.semantics {
                sems.push(SemNode {
                    id: next,
                    role: s.role,
                    label: s.label.clone(),
                    rect: Rect::default(),
                    enabled: s.enabled,
                });
            }
        });
        (hits, sems)
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    type Events = Rc<RefCell<Vec<String>>>;

    fn events() -> Events {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_signal_basic() {
        let sig = signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);
        assert_eq!(sig.version(), 2);
    }

    #[test]
    fn test_signal_subscription() {
        let sig = signal(0);
        let called = Rc::new(Cell::new(0));

        let called_clone = called.clone();
        let id = sig.subscribe(move |v| {
            called_clone.set(*v);
        });

        sig.set(42);
        assert_eq!(called.get(), 42);

        sig.unsubscribe(id);
        sig.set(7);
        assert_eq!(called.get(), 42);
    }

    #[test]
    fn test_equal_write_is_noop() {
        let sig = signal(5);
        let subscriber_calls = Rc::new(Cell::new(0));
        let observer_runs = Rc::new(Cell::new(0));

        let calls = subscriber_calls.clone();
        sig.subscribe(move |_| calls.set(calls.get() + 1));

        let obs = reactive::new_observer({
            let sig = sig.clone();
            let runs = observer_runs.clone();
            move || {
                sig.get();
                runs.set(runs.get() + 1);
            }
        });
        reactive::run_observer_now(obs);
        assert_eq!(observer_runs.get(), 1);

        sig.set(5);
        sig.update(|v| *v = 5);
        assert_eq!(sig.version(), 0);
        assert_eq!(subscriber_calls.get(), 0);
        assert_eq!(observer_runs.get(), 1);

        sig.set(6);
        assert_eq!(sig.version(), 1);
        assert_eq!(subscriber_calls.get(), 1);
        assert_eq!(observer_runs.get(), 2);
        reactive::remove_observer(obs);
    }

    #[test]
    fn test_untracked_reads_do_not_subscribe() {
        let sig = signal(1);
        let runs = Rc::new(Cell::new(0));
        let obs = reactive::new_observer({
            let sig = sig.clone();
            let runs = runs.clone();
            move || {
                untracked(|| sig.get());
                runs.set(runs.get() + 1);
            }
        });
        reactive::run_observer_now(obs);
        assert_eq!(reactive::dependents_of(sig.id()), 0);

        sig.set(2);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_derived_republishes_only_on_change() {
        let count = signal(1);
        let is_multiple_of_five = Derived::new({
            let count = count.clone();
            move || count.get() % 5 == 0
        });
        assert!(!is_multiple_of_five.get_untracked());

        let readers = Rc::new(Cell::new(0));
        let obs = reactive::new_observer({
            let d = is_multiple_of_five.clone();
            let readers = readers.clone();
            move || {
                d.get();
                readers.set(readers.get() + 1);
            }
        });
        reactive::run_observer_now(obs);

        count.set(2);
        count.set(3);
        assert_eq!(is_multiple_of_five.computations(), 3);
        assert_eq!(is_multiple_of_five.version(), 0);
        assert_eq!(readers.get(), 1);

        count.set(5);
        assert!(is_multiple_of_five.get_untracked());
        assert_eq!(is_multiple_of_five.version(), 1);
        assert_eq!(readers.get(), 2);
        reactive::remove_observer(obs);
    }

    #[test]
    fn test_dropped_derived_chain_stops_recomputing() {
        let source = signal(1);
        let inner_runs = Rc::new(Cell::new(0));
        let doubled = Derived::new({
            let (source, runs) = (source.clone(), inner_runs.clone());
            move || {
                runs.set(runs.get() + 1);
                source.get() * 2
            }
        });
        let plus_one = Derived::new({
            let doubled = doubled.clone();
            move || doubled.get() + 1
        });
        assert_eq!(plus_one.get_untracked(), 3);
        assert_eq!(inner_runs.get(), 1);

        // the outer cell now owns the only handle to the inner one
        drop(doubled);
        drop(plus_one);
        source.set(2);
        source.set(3);

        assert_eq!(inner_runs.get(), 1);
        assert_eq!(reactive::dependents_of(source.id()), 0);
    }

    #[test]
    fn test_dropping_cells_releases_graph_entries() {
        let before = reactive::graph_size();
        for i in 0..100 {
            let count = signal(i);
            let next = Derived::new(move || count.get() + 1);
            assert_eq!(next.get_untracked(), i + 1);
        }
        assert_eq!(reactive::graph_size(), before);
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let order = events();

        let scope = Scope::new();
        let child = scope.child();
        let o = order.clone();
        scope.add_disposer(move || o.borrow_mut().push("parent".into()));
        let o = order.clone();
        child.add_disposer(move || o.borrow_mut().push("child".into()));

        assert!(order.borrow().is_empty());
        scope.dispose();
        scope.dispose();
        assert_eq!(*order.borrow(), ["child", "parent"]);

        let o = order.clone();
        scope.add_disposer(move || o.borrow_mut().push("late".into()));
        assert_eq!(order.borrow().last().map(String::as_str), Some("late"));
    }

    #[test]
    fn test_only_invalid_groups_recompose() {
        let a = signal(0);
        let b = signal(0);
        let root_runs = Rc::new(Cell::new(0));
        let child_runs = Rc::new(Cell::new(0));

        let mut comp = Composition::new({
            let (a, b) = (a.clone(), b.clone());
            let (root_runs, child_runs) = (root_runs.clone(), child_runs.clone());
            move || {
                root_runs.set(root_runs.get() + 1);
                let av = a.get();
                let b = b.clone();
                let child_runs = child_runs.clone();
                column(vec![
                    text(format!("a={av}")),
                    group(move || {
                        child_runs.set(child_runs.get() + 1);
                        text(format!("b={}", b.get()))
                    }),
                ])
            }
        });
        assert!(comp.has_pending());

        let f = comp.frame(flat).unwrap();
        assert_eq!(f.texts(), ["a=0", "b=0"]);
        assert_eq!(f.recomposed, 2);
        assert!(!comp.has_pending());

        b.set(1);
        assert!(comp.has_pending());
        let f = comp.frame(flat).unwrap();
        assert_eq!(f.texts(), ["a=0", "b=1"]);
        assert_eq!(f.recomposed, 1);
        assert_eq!(root_runs.get(), 1);
        assert_eq!(child_runs.get(), 2);

        b.set(1);
        assert!(!comp.has_pending());

        a.set(1);
        let f = comp.frame(flat).unwrap();
        assert_eq!(f.texts(), ["a=1", "b=1"]);
        assert_eq!(f.recomposed, 2);
        assert_eq!(comp.group_count(), 2);
    }

    #[test]
    fn test_remember_survives_recomposition() {
        let tick = signal(0);
        let mut comp = Composition::new({
            let tick = tick.clone();
            move || {
                tick.get();
                let renders = remember(|| Cell::new(0));
                renders.set(renders.get() + 1);
                let named = remember_with_key("named", || 42);
                let seen = remember_state(Vec::new);
                seen.borrow_mut().push(renders.get());
                text(format!("renders={} named={} seen={:?}", renders.get(), named, seen.borrow()))
            }
        });
        assert_eq!(comp.frame(flat).unwrap().texts(), ["renders=1 named=42 seen=[1]"]);
        tick.set(1);
        assert_eq!(comp.frame(flat).unwrap().texts(), ["renders=2 named=42 seen=[1, 2]"]);
    }

    #[test]
    fn test_key_change_composes_fresh_group() {
        let k = signal(0u32);
        let nudge = signal(0);
        let disposed = Rc::new(Cell::new(0));

        let mut comp = Composition::new({
            let (k, nudge, disposed) = (k.clone(), nudge.clone(), disposed.clone());
            move || {
                let kv = k.get();
                let nudge = nudge.clone();
                let disposed = disposed.clone();
                key(kv, move || {
                    nudge.get();
                    let renders = remember(|| Cell::new(0));
                    renders.set(renders.get() + 1);
                    let d = disposed.clone();
                    disposable_effect((), move || on_unmount(move || d.set(d.get() + 1)));
                    text(format!("renders={}", renders.get()))
                })
            }
        });

        assert_eq!(comp.frame(flat).unwrap().texts(), ["renders=1"]);
        nudge.set(1);
        assert_eq!(comp.frame(flat).unwrap().texts(), ["renders=2"]);
        assert_eq!(disposed.get(), 0);

        k.set(1);
        assert_eq!(comp.frame(flat).unwrap().texts(), ["renders=1"]);
        assert_eq!(disposed.get(), 1);
        assert_eq!(comp.group_count(), 2);
    }

    #[test]
    fn test_side_effect_runs_after_layout_each_render() {
        let tick = signal(0);
        let log = events();

        let mut comp = Composition::new({
            let (tick, log) = (tick.clone(), log.clone());
            move || {
                let n = tick.get();
                let l = log.clone();
                side_effect(move || l.borrow_mut().push(format!("side {n}")));
                let l = log.clone();
                side_effect(move || l.borrow_mut().push(format!("second {n}")));
                text(format!("tick {n}"))
            }
        });

        let layout = |log: &Events| {
            let log = log.clone();
            move |v: &View, size: (u32, u32)| {
                log.borrow_mut().push("layout".into());
                flat(v, size)
            }
        };

        comp.frame(layout(&log)).unwrap();
        tick.set(1);
        comp.frame(layout(&log)).unwrap();
        // nothing invalid: no render, no side effect
        comp.frame(layout(&log)).unwrap();

        assert_eq!(
            *log.borrow(),
            ["layout", "side 0", "second 0", "layout", "side 1", "second 1", "layout"]
        );
    }

    #[test]
    fn test_side_effect_skipped_when_group_leaves_in_same_frame() {
        let n = signal(0);
        let hide = signal(false);
        let log = events();

        let mut comp = Composition::new({
            let (n, hide, log) = (n.clone(), hide.clone(), log.clone());
            move || {
                if hide.get() {
                    return text("hidden");
                }
                let (n, hide, log) = (n.clone(), hide.clone(), log.clone());
                column(vec![group(move || {
                    let v = n.get();
                    let l = log.clone();
                    side_effect(move || l.borrow_mut().push(format!("side {v}")));
                    if v > 0 {
                        hide.set(true);
                    }
                    text(format!("n={v}"))
                })])
            }
        });

        assert_eq!(comp.frame(flat).unwrap().texts(), ["n=0"]);
        // the group re-runs first, then its parent drops it in a later pass
        n.set(1);
        assert_eq!(comp.frame(flat).unwrap().texts(), ["hidden"]);
        assert_eq!(*log.borrow(), ["side 0"]);
    }

    #[test]
    fn test_disposable_effect_cleans_up_on_key_change_and_removal() {
        let keys = signal(0);
        let show = signal(true);
        let log = events();

        let mut comp = Composition::new({
            let (keys, show, log) = (keys.clone(), show.clone(), log.clone());
            move || {
                if !show.get() {
                    return text("hidden");
                }
                let k = keys.get();
                let log = log.clone();
                group(move || {
                    let ev = log.clone();
                    disposable_effect(k, move || {
                        ev.borrow_mut().push(format!("start {k}"));
                        let ev = ev.clone();
                        on_unmount(move || ev.borrow_mut().push(format!("dispose {k}")))
                    });
                    text(format!("key {k}"))
                })
            }
        });

        comp.frame(flat).unwrap();
        assert_eq!(*log.borrow(), ["start 0"]);

        keys.set(1);
        comp.frame(flat).unwrap();
        assert_eq!(*log.borrow(), ["start 0", "dispose 0", "start 1"]);

        show.set(false);
        let f = comp.frame(flat).unwrap();
        assert_eq!(f.texts(), ["hidden"]);
        assert_eq!(*log.borrow(), ["start 0", "dispose 0", "start 1", "dispose 1"]);
    }

    #[test]
    fn test_frame_click_targets_enabled_buttons() {
        let count = signal(0);
        let mut comp = Composition::new({
            let count = count.clone();
            move || {
                let c = count.clone();
                column(vec![
                    text(format!("count {}", count.get())),
                    button("N++", true, move || c.update(|n| *n += 1)),
                    button("Disabled", false, || {}),
                ])
            }
        });

        let f = comp.frame(flat).unwrap();
        assert!(f.click("N++"));
        assert!(!f.click("Disabled"));
        assert!(!f.click("Missing"));
        assert!(!f.is_enabled("Disabled"));
        assert_eq!(count.get_untracked(), 1);
        assert_eq!(comp.frame(flat).unwrap().texts(), ["count 1"]);
    }

    #[test]
    fn test_dispose_composition() {
        let disposed = Rc::new(Cell::new(false));
        let mut comp = Composition::new({
            let disposed = disposed.clone();
            move || {
                let d = disposed.clone();
                disposable_effect((), move || on_unmount(move || d.set(true)));
                group(|| text("inner"))
            }
        });
        comp.frame(flat).unwrap();
        assert_eq!(live_groups(), 2);

        comp.dispose();
        assert!(disposed.get());
        assert!(comp.is_disposed());
        assert_eq!(live_groups(), 0);
        assert_eq!(comp.frame(flat).err(), Some(RuntimeError::Disposed));
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex("#FF5733");
        assert_eq!(c, Color(255, 87, 51, 255));

        let c_alpha = Color::from_hex("#FF5733AA");
        assert_eq!(c_alpha, Color(255, 87, 51, 170));

        assert_eq!(Color::GREEN.to_string(), "#00FF00");
        assert_eq!(Color::from_hex("nonsense"), Color::BLACK);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect {
            x: 10.0,
            y: 10.0,
            w: 100.0,
            h: 50.0,
        };

        assert!(rect.contains(Vec2 { x: 50.0, y: 30.0 }));
        assert!(!rect.contains(Vec2 { x: 5.0, y: 30.0 }));
        assert!(!rect.contains(Vec2 { x: 50.0, y: 70.0 }));
    }

    #[test]
    fn test_ui_state() {
        let s: UiState<u32, String> = UiState::default();
        assert!(s.is_loading());
        let s: UiState<u32, String> = UiState::Success(2);
        assert_eq!(s.clone().map(|v| v * 2).success(), Some(&4));
        assert!(UiState::<(), String>::Error("boom".into()).is_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_cancel_drops_future_synchronously() {
        LocalSet::new()
            .run_until(async {
                let cancelled = Rc::new(Cell::new(false));
                let c = cancelled.clone();
                let job = launch(async move {
                    let _guard = on_cancel(move || c.set(true));
                    std::future::pending::<()>().await;
                });
                settle().await;
                assert!(job.is_active());

                job.cancel();
                assert!(cancelled.get());
                assert!(job.is_cancelled());

                let finished = Rc::new(Cell::new(false));
                let f = finished.clone();
                let done = launch(async move {
                    let guard = on_cancel(move || f.set(true));
                    sleep(Duration::from_millis(10)).await;
                    guard.complete();
                });
                sleep(Duration::from_millis(20)).await;
                assert!(done.is_completed());
                assert!(!finished.get());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_launched_effect_restarts_only_on_key_change() {
        LocalSet::new()
            .run_until(async {
                let keys = signal(0);
                let nudge = signal(0);
                let log = events();

                let mut comp = Composition::new({
                    let (keys, nudge, log) = (keys.clone(), nudge.clone(), log.clone());
                    move || {
                        nudge.get();
                        let k = keys.get();
                        let ev = log.clone();
                        launched_effect(k, move || async move {
                            ev.borrow_mut().push(format!("start {k}"));
                            let on_stop = ev.clone();
                            let _guard =
                                on_cancel(move || on_stop.borrow_mut().push(format!("cancel {k}")));
                            std::future::pending::<()>().await;
                        });
                        text(format!("key {k}"))
                    }
                });

                comp.frame(flat).unwrap();
                // bodies start after the frame, never inside it
                assert!(log.borrow().is_empty());
                settle().await;

                keys.set(1);
                comp.frame(flat).unwrap();
                settle().await;

                nudge.set(1);
                comp.frame(flat).unwrap();
                settle().await;

                keys.set(2);
                comp.frame(flat).unwrap();
                settle().await;

                comp.dispose();
                assert_eq!(
                    *log.borrow(),
                    ["start 0", "cancel 0", "start 1", "cancel 1", "start 2", "cancel 2"]
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_launched_counter_with_key_flip() {
        LocalSet::new()
            .run_until(async {
                let flip = signal(false);
                let counter = signal(0);

                let mut comp = Composition::new({
                    let (flip, counter) = (flip.clone(), counter.clone());
                    move || {
                        let k = flip.get();
                        let c = counter.clone();
                        launched_effect(k, move || async move {
                            c.set(0);
                            loop {
                                sleep(Duration::from_secs(1)).await;
                                c.update(|n| *n += 1);
                            }
                        });
                        text(format!("Counter: {}", counter.get()))
                    }
                });
                comp.frame(flat).unwrap();
                settle().await;

                sleep(Duration::from_millis(500)).await;
                flip.set(true);
                comp.frame(flat).unwrap();
                settle().await;

                sleep(Duration::from_millis(700)).await;
                assert_eq!(counter.get_untracked(), 0);

                sleep(Duration::from_millis(400)).await;
                assert_eq!(counter.get_untracked(), 1);
                assert_eq!(comp.frame(flat).unwrap().texts(), ["Counter: 1"]);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_launches_overlap() {
        LocalSet::new()
            .run_until(async {
                let scope = CoroutineScope::new();
                let a = signal(0);
                let b = signal(0);

                let ticker = |s: Signal<i32>| async move {
                    for _ in 0..5 {
                        sleep(Duration::from_secs(1)).await;
                        s.update(|n| *n += 1);
                    }
                };
                scope.launch(ticker(a.clone()));
                sleep(Duration::from_millis(500)).await;
                scope.launch(ticker(b.clone()));

                sleep(Duration::from_millis(2100)).await;
                assert_eq!((a.get_untracked(), b.get_untracked()), (2, 2));
                assert_eq!(scope.active_jobs(), 2);

                scope.cancel();
                sleep(Duration::from_secs(3)).await;
                assert_eq!((a.get_untracked(), b.get_untracked()), (2, 2));

                assert!(scope.launch(async {}).is_cancelled());
                assert_eq!(
                    scope.try_launch(async {}).err(),
                    Some(RuntimeError::ScopeCancelled)
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_remembered_coroutine_scope_follows_group() {
        LocalSet::new()
            .run_until(async {
                let show = signal(true);
                let nudge = signal(0);
                let seen: Rc<RefCell<Vec<CoroutineScope>>> = Rc::new(RefCell::new(Vec::new()));

                let mut comp = Composition::new({
                    let (show, nudge, seen) = (show.clone(), nudge.clone(), seen.clone());
                    move || {
                        if !show.get() {
                            return text("gone");
                        }
                        let (nudge, seen) = (nudge.clone(), seen.clone());
                        group(move || {
                            nudge.get();
                            seen.borrow_mut().push(remember_coroutine_scope());
                            text("scope")
                        })
                    }
                });
                comp.frame(flat).unwrap();
                let first = seen.borrow()[0].clone();
                first.launch(std::future::pending::<()>());

                nudge.set(1);
                comp.frame(flat).unwrap();
                let second = seen.borrow()[1].clone();
                assert_eq!(second.active_jobs(), 1);

                show.set(false);
                comp.frame(flat).unwrap();
                assert!(first.is_cancelled());
                assert_eq!(first.active_jobs(), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_produce_state_conflates_and_stops() {
        LocalSet::new()
            .run_until(async {
                let show = signal(true);
                let disposed = Rc::new(Cell::new(false));
                let produced: Rc<RefCell<Option<Signal<i32>>>> = Rc::new(RefCell::new(None));

                let mut comp = Composition::new({
                    let (show, disposed, produced) = (show.clone(), disposed.clone(), produced.clone());
                    move || {
                        if !show.get() {
                            return text("removed");
                        }
                        let (disposed, produced) = (disposed.clone(), produced.clone());
                        group(move || {
                            let disposed = disposed.clone();
                            let state = produce_state(0, move |scope| async move {
                                for v in [1, 1, 2] {
                                    sleep(Duration::from_secs(1)).await;
                                    scope.set_value(v);
                                }
                                scope.await_dispose(move || disposed.set(true)).await;
                            });
                            *produced.borrow_mut() = Some(state.clone());
                            text(format!("Counter: {}", state.get()))
                        })
                    }
                });
                comp.frame(flat).unwrap();
                settle().await;

                sleep(Duration::from_millis(3500)).await;
                let state = produced.borrow().clone().unwrap();
                assert_eq!(state.get_untracked(), 2);
                assert_eq!(state.version(), 2);
                assert_eq!(comp.frame(flat).unwrap().texts(), ["Counter: 2"]);
                assert!(!disposed.get());

                show.set(false);
                comp.frame(flat).unwrap();
                assert!(disposed.get());
            })
            .await;
    }

    #[tokio::test]
    async fn test_snapshot_flow_emits_distinct_values() {
        let count = signal(0);
        let mut flow = snapshot_flow({
            let count = count.clone();
            move || count.get() >= 2
        });
        count.set(1);
        count.set(2);
        count.set(3);

        assert_eq!(flow.next().await, Some(false));
        assert_eq!(flow.next().await, Some(true));
        assert_eq!(flow.next().now_or_never(), None);

        count.set(0);
        assert_eq!(flow.next().await, Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_updated_state_reaches_running_effect() {
        LocalSet::new()
            .run_until(async {
                let value = signal(0);
                let seen: Rc<RefCell<Vec<(i32, i32)>>> = Rc::new(RefCell::new(Vec::new()));

                let mut comp = Composition::new({
                    let (value, seen) = (value.clone(), seen.clone());
                    move || {
                        let captured = value.get();
                        let latest = remember_updated_state(captured);
                        let seen = seen.clone();
                        launched_effect((), move || async move {
                            sleep(Duration::from_secs(1)).await;
                            seen.borrow_mut().push((captured, latest.get_untracked()));
                        });
                        text(format!("value {captured}"))
                    }
                });
                comp.frame(flat).unwrap();
                settle().await;

                value.set(5);
                comp.frame(flat).unwrap();
                sleep(Duration::from_millis(1100)).await;
                assert_eq!(*seen.borrow(), [(0, 5)]);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_collect_with_lifecycle_restarts_on_activation() {
        LocalSet::new()
            .run_until(async {
                let lifecycle = Lifecycle::new();
                let (tx, rx) = watch::channel(0);
                let seen: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));

                let s = seen.clone();
                let job = launch(collect_with_lifecycle(lifecycle.clone(), rx, move |v| {
                    s.borrow_mut().push(v)
                }));
                settle().await;
                assert!(seen.borrow().is_empty());

                lifecycle.set_state(LifecycleState::Started);
                settle().await;
                tx.send_replace(1);
                settle().await;
                assert_eq!(*seen.borrow(), [0, 1]);

                lifecycle.set_state(LifecycleState::Created);
                settle().await;
                tx.send_replace(2);
                settle().await;
                assert_eq!(*seen.borrow(), [0, 1]);

                lifecycle.set_state(LifecycleState::Resumed);
                settle().await;
                assert_eq!(*seen.borrow(), [0, 1, 2]);

                lifecycle.set_state(LifecycleState::Destroyed);
                settle().await;
                assert!(job.is_completed());

                lifecycle.set_state(LifecycleState::Resumed);
                assert_eq!(lifecycle.state(), LifecycleState::Destroyed);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_on_lifecycle_waits_after_block_finishes() {
        LocalSet::new()
            .run_until(async {
                let lifecycle = Lifecycle::new();
                let log = events();

                let l = log.clone();
                let job = launch(repeat_on_lifecycle(lifecycle.clone(), LifecycleState::Started, move || {
                    let l = l.clone();
                    async move { l.borrow_mut().push("run".to_string()) }
                }));
                lifecycle.set_state(LifecycleState::Started);
                settle().await;
                lifecycle.set_state(LifecycleState::Resumed);
                settle().await;
                assert_eq!(*log.borrow(), ["run"]);

                lifecycle.set_state(LifecycleState::Created);
                settle().await;
                lifecycle.set_state(LifecycleState::Started);
                settle().await;
                assert_eq!(*log.borrow(), ["run", "run"]);

                lifecycle.set_state(LifecycleState::Destroyed);
                settle().await;
                assert!(job.is_completed());
            })
            .await;
    }
}
